//! API request/response models for assessments.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    assessment::{Assessment, StructureType},
    db::models::assessments::AssessmentTotals,
    errors::Error,
};

/// Rooftop details submitted for assessment.
///
/// Only `roof_area` is required. Missing coordinates are replaced by the configured default
/// location before rainfall is looked up.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssessmentCreate {
    /// Catchment roof area in square metres (must be greater than zero)
    #[schema(example = 100.0)]
    pub roof_area: f64,
    /// Number of people living in the building
    pub dwellers: Option<u32>,
    /// Open ground available for a recharge structure, in square metres
    pub open_space: Option<f64>,
    /// Roofing material, free text (e.g. "RCC", "GI sheet")
    pub roof_type: Option<String>,
    /// Latitude in decimal degrees
    #[schema(example = 28.6139)]
    pub lat: Option<f64>,
    /// Longitude in decimal degrees
    #[schema(example = 77.209)]
    pub lng: Option<f64>,
}

impl AssessmentCreate {
    /// Range checks the JSON types cannot express.
    pub fn validate(&self) -> Result<(), Error> {
        if !self.roof_area.is_finite() || self.roof_area <= 0.0 {
            return Err(Error::Validation {
                message: "roof_area must be a number greater than zero".to_string(),
            });
        }

        if let Some(open_space) = self.open_space
            && (!open_space.is_finite() || open_space < 0.0)
        {
            return Err(Error::Validation {
                message: "open_space must not be negative".to_string(),
            });
        }

        Ok(())
    }
}

/// Assessment outcome returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssessmentResponse {
    /// Litres collectable per year, rounded to two decimals
    #[schema(example = 2550.0)]
    pub captured_volume: f64,
    /// Recommended recharge structure
    pub structure_type: StructureType,
    /// Structure dimensions (length × width × depth)
    #[schema(example = "2m × 4m × 4m")]
    pub dimensions: String,
    /// Estimated cost in rupees
    #[schema(example = 25000.0)]
    pub cost: f64,
    /// Total rainfall over the lookup window in millimetres
    #[schema(example = 30.0)]
    pub annual_rainfall: f64,
}

impl From<&Assessment> for AssessmentResponse {
    fn from(assessment: &Assessment) -> Self {
        Self {
            captured_volume: round_to_hundredths(assessment.captured_volume_litres),
            structure_type: assessment.recommendation.structure_type,
            dimensions: assessment.recommendation.dimensions.to_string(),
            cost: assessment.recommendation.cost,
            annual_rainfall: assessment.annual_rainfall_mm,
        }
    }
}

/// Community totals across every assessment ever stored.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssessmentStats {
    /// Number of stored assessments
    pub total_assessments: i64,
    /// Sum of captured volume over all assessments, in litres
    pub total_litres: f64,
}

impl From<AssessmentTotals> for AssessmentStats {
    fn from(totals: AssessmentTotals) -> Self {
        Self {
            total_assessments: totals.total_assessments,
            total_litres: totals.total_litres,
        }
    }
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
