//! Individual compliance checks.
//!
//! Each check is a pure function of its inputs and returns exactly one
//! finding (the AC check returns one per segment). A missing or unusable
//! input field becomes a failing finding naming the field.

pub mod ac_voltage_drop;
pub mod ambient_temperature;
pub mod bom_sld;
pub mod cold_voc;
pub mod dc_ac_ratio;
pub mod mppt_window;
pub mod string_length;

pub use ac_voltage_drop::check_ac_voltage_drop;
pub use ambient_temperature::check_high_ambient_temperature;
pub use bom_sld::check_bom_vs_sld;
pub use cold_voc::check_cold_weather_voc;
pub use dc_ac_ratio::check_dc_ac_ratio;
pub use mppt_window::check_mppt_window;
pub use string_length::check_string_length;

use crate::error::CoreError;

/// A finite number, or `MissingField` naming `field`.
pub(crate) fn require_finite(value: Option<f64>, field: &'static str) -> Result<f64, CoreError> {
    match value {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(CoreError::MissingField { field }),
    }
}

/// A finite number strictly above zero.
pub(crate) fn require_positive(value: Option<f64>, field: &'static str) -> Result<f64, CoreError> {
    match require_finite(value, field)? {
        v if v > 0.0 => Ok(v),
        _ => Err(CoreError::MissingField { field }),
    }
}

/// A count of at least one.
pub(crate) fn require_count(value: Option<u32>, field: &'static str) -> Result<u32, CoreError> {
    match value {
        Some(n) if n > 0 => Ok(n),
        _ => Err(CoreError::MissingField { field }),
    }
}

/// Collects the names of missing fields across several lookups so a check
/// can report all of them in one finding.
#[derive(Debug, Default)]
pub(crate) struct MissingFields(Vec<&'static str>);

impl MissingFields {
    pub(crate) fn take<T>(&mut self, result: Result<T, CoreError>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(CoreError::MissingField { field }) => {
                self.0.push(field);
                None
            }
            Err(_) => None,
        }
    }

    pub(crate) fn fields(&self) -> &[&'static str] {
        &self.0
    }
}
