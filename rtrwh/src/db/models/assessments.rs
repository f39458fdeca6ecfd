//! Database models for assessments.

use sqlx::FromRow;

use crate::assessment::StructureType;

/// Request for inserting an assessment row.
///
/// All computed columns are filled by the engine; nothing here comes straight from the caller
/// except the descriptive roof fields and the (possibly substituted) coordinates.
#[derive(Debug, Clone)]
pub struct AssessmentCreateDBRequest {
    pub roof_area: f64,
    pub dwellers: Option<i64>,
    pub open_space: Option<f64>,
    pub roof_type: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub annual_rainfall: f64,
    pub captured_volume: f64,
    pub structure_type: StructureType,
    pub cost: f64,
}

/// Aggregate over every stored assessment
#[derive(Debug, Clone, Copy, PartialEq, FromRow)]
pub struct AssessmentTotals {
    pub total_assessments: i64,
    pub total_litres: f64,
}
