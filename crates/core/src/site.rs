//! Site context: location and design temperature extremes.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Where the design minimum temperature came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TminSource {
    /// Historical weather archive lookup.
    Api,
    /// Entered by the reviewer.
    Manual,
}

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Site conditions the checks are evaluated against.
///
/// Fields are private so a context cannot change once a review starts; build
/// one with [`SiteContext::new`], which rejects out-of-range input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteContext {
    location: GeoPoint,
    tmin_c: f64,
    tmax_c: f64,
    tmin_source: TminSource,
}

impl SiteContext {
    pub fn new(
        location: GeoPoint,
        tmin_c: f64,
        tmax_c: f64,
        tmin_source: TminSource,
    ) -> Result<Self, CoreError> {
        if !(-90.0..=90.0).contains(&location.lat) {
            return Err(CoreError::Validation(format!(
                "latitude must be between -90 and 90, got {}",
                location.lat
            )));
        }
        if !(-180.0..=180.0).contains(&location.lon) {
            return Err(CoreError::Validation(format!(
                "longitude must be between -180 and 180, got {}",
                location.lon
            )));
        }
        if !tmin_c.is_finite() || !tmax_c.is_finite() {
            return Err(CoreError::Validation(
                "design temperatures must be finite numbers".to_string(),
            ));
        }
        if tmin_c > tmax_c {
            return Err(CoreError::Validation(format!(
                "tmin ({tmin_c}) must be <= tmax ({tmax_c})"
            )));
        }
        Ok(Self {
            location,
            tmin_c,
            tmax_c,
            tmin_source,
        })
    }

    pub fn location(&self) -> GeoPoint {
        self.location
    }

    /// Design minimum ambient temperature in °C.
    pub fn tmin_c(&self) -> f64 {
        self.tmin_c
    }

    /// Design maximum ambient temperature in °C.
    pub fn tmax_c(&self) -> f64 {
        self.tmax_c
    }

    pub fn tmin_source(&self) -> TminSource {
        self.tmin_source
    }
}
