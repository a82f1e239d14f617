use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// A validated WGS84 point. Out-of-range values are rejected at construction
/// (and at deserialization), so a `Coordinate` in hand is always usable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ModelError> {
        if !(-90.0..=90.0).contains(&latitude) || latitude.is_nan() {
            return Err(ModelError::Validation(format!(
                "latitude must be between -90 and 90, got {latitude}"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) || longitude.is_nan() {
            return Err(ModelError::Validation(format!(
                "longitude must be between -180 and 180, got {longitude}"
            )));
        }
        Ok(Self { latitude, longitude })
    }
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = ModelError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.latitude, raw.longitude)
    }
}
