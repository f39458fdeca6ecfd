//! Rainwater harvesting assessment engine.
//!
//! Pure computation over a roof area and a daily rainfall series:
//!
//! - [`annual_rainfall`]: total millimetres over the series, ignoring missing days
//! - [`captured_volume`]: litres collectable per year at the fixed [`RUNOFF_COEFFICIENT`]
//! - [`recommend_structure`]: recharge structure chosen from a fixed roof-area table
//!
//! One millimetre of rain over one square metre is one litre, so
//! `roof_area (m²) × rainfall (mm) × coefficient` is already in litres.
//!
//! Inputs are expected to be finite; the API layer rejects anything else before it gets here.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Fraction of rainfall on a roof that ends up as collectable runoff.
pub const RUNOFF_COEFFICIENT: f64 = 0.85;

/// Roofs strictly below this area (m²) get a small pit.
pub const SMALL_PIT_MAX_AREA: f64 = 50.0;

/// Roofs up to and including this area (m²) get a medium pit.
pub const MEDIUM_PIT_MAX_AREA: f64 = 200.0;

/// Recommended recharge structure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum StructureType {
    #[serde(rename = "Small Pit")]
    SmallPit,
    #[serde(rename = "Medium Pit")]
    MediumPit,
    #[serde(rename = "Trench/Shaft")]
    TrenchShaft,
}

impl StructureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StructureType::SmallPit => "Small Pit",
            StructureType::MediumPit => "Medium Pit",
            StructureType::TrenchShaft => "Trench/Shaft",
        }
    }

    /// Excavation dimensions (length × width × depth).
    pub fn dimensions(&self) -> &'static str {
        match self {
            StructureType::SmallPit => "1.5m × 1.5m × 1.5m",
            StructureType::MediumPit => "2m × 4m × 4m",
            StructureType::TrenchShaft => "3m × 6m × 2m",
        }
    }

    /// Estimated construction cost in rupees.
    pub fn cost(&self) -> f64 {
        match self {
            StructureType::SmallPit => 15000.0,
            StructureType::MediumPit => 25000.0,
            StructureType::TrenchShaft => 40000.0,
        }
    }
}

impl fmt::Display for StructureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structure recommendation with its fixed dimensions and cost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Recommendation {
    pub structure_type: StructureType,
    pub dimensions: &'static str,
    pub cost: f64,
}

impl From<StructureType> for Recommendation {
    fn from(structure_type: StructureType) -> Self {
        Self {
            structure_type,
            dimensions: structure_type.dimensions(),
            cost: structure_type.cost(),
        }
    }
}

/// Outcome of assessing one roof against one rainfall series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assessment {
    pub annual_rainfall_mm: f64,
    pub captured_volume_litres: f64,
    pub recommendation: Recommendation,
}

/// Sum of the daily precipitation series in millimetres. Missing days count as zero.
pub fn annual_rainfall(daily: &[Option<f64>]) -> f64 {
    daily.iter().flatten().sum()
}

/// Litres collectable per year from `roof_area` m² receiving `annual_rainfall_mm`.
pub fn captured_volume(roof_area: f64, annual_rainfall_mm: f64) -> f64 {
    roof_area * annual_rainfall_mm * RUNOFF_COEFFICIENT
}

/// Pick a recharge structure from the roof area alone.
///
/// | roof area (m²) | structure    |
/// |----------------|--------------|
/// | < 50           | Small Pit    |
/// | 50 ..= 200     | Medium Pit   |
/// | > 200          | Trench/Shaft |
pub fn recommend_structure(roof_area: f64) -> Recommendation {
    let structure_type = if roof_area < SMALL_PIT_MAX_AREA {
        StructureType::SmallPit
    } else if roof_area <= MEDIUM_PIT_MAX_AREA {
        StructureType::MediumPit
    } else {
        StructureType::TrenchShaft
    };
    structure_type.into()
}

/// Run the full assessment for a roof.
pub fn assess(roof_area: f64, daily: &[Option<f64>]) -> Assessment {
    let annual_rainfall_mm = annual_rainfall(daily);
    Assessment {
        annual_rainfall_mm,
        captured_volume_litres: captured_volume(roof_area, annual_rainfall_mm),
        recommendation: recommend_structure(roof_area),
    }
}
