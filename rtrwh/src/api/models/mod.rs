//! API request and response data models.
//!
//! API models are kept apart from the database models in [`crate::db::models`] so the wire
//! format and the stored columns can change independently. Every model derives `ToSchema`
//! for the generated OpenAPI document.

pub mod assessments;
pub mod service;
