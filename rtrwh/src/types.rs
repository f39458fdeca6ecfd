//! Common type definitions shared by the API, engine and storage layers.
//!
//! - [`AssessmentId`]: Row identifier assigned by the `assessments` table
//! - [`Coordinates`]: A latitude/longitude pair in decimal degrees

use serde::{Deserialize, Serialize};
use std::fmt;

/// Auto-incrementing row identifier of a persisted assessment.
pub type AssessmentId = i64;

/// Latitude/longitude in decimal degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Fill whichever half is missing from `fallback`. Zero is a real coordinate, not "missing".
    pub fn or_fallback(lat: Option<f64>, lng: Option<f64>, fallback: Coordinates) -> Self {
        Self {
            lat: lat.unwrap_or(fallback.lat),
            lng: lng.unwrap_or(fallback.lng),
        }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.lat, self.lng)
    }
}
