//! Repository implementations for database access.
//!
//! Each repository wraps a SQLx connection (or transaction) and returns models from
//! [`crate::db::models`].
//!
//! - [`Assessments`]: append-only assessment rows and their aggregate

pub mod assessments;

pub use assessments::Assessments;
