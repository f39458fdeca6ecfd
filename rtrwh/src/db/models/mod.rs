//! Database record structures.

pub mod assessments;
