//! Configurable rule thresholds.
//!
//! Defaults follow IEC 62548 (5 % cold-weather Voc margin) and the SEC cable
//! sizing practice of 3 % inverter-to-combiner and 1.5 % combiner-to-MDB
//! voltage drop. DC/AC ratio bands follow SEC best practice: 1.0 to 1.3 is
//! optimal and anything above 1.5 clips heavily.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;

/// Default margin below the inverter DC limit that triggers a warning (%).
pub const DEFAULT_COLD_VOC_WARNING_MARGIN_PCT: f64 = 5.0;
/// Default voltage-drop limit for standard (branch/feeder) runs (%).
pub const DEFAULT_STANDARD_DROP_LIMIT_PCT: f64 = 3.0;
/// Default voltage-drop limit for strict runs (%).
pub const DEFAULT_STRICT_DROP_LIMIT_PCT: f64 = 1.5;
/// Ambient temperature above which equipment derating applies (°C).
pub const DEFAULT_HIGH_AMBIENT_TEMP_C: f64 = 45.0;
/// DC/AC ratio below which the inverter is oversized.
pub const DEFAULT_DC_AC_RATIO_MIN: f64 = 1.0;
/// DC/AC ratio above which clipping is expected.
pub const DEFAULT_DC_AC_RATIO_WARN_MAX: f64 = 1.3;
/// DC/AC ratio above which clipping losses are unacceptable.
pub const DEFAULT_DC_AC_RATIO_FAIL_MAX: f64 = 1.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RuleThresholds {
    #[validate(range(min = 0.0, max = 50.0))]
    pub cold_voc_warning_margin_pct: f64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub standard_drop_limit_pct: f64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub strict_drop_limit_pct: f64,
    #[validate(range(min = -50.0, max = 80.0))]
    pub high_ambient_temp_c: f64,
    #[validate(range(min = 0.1, max = 5.0))]
    pub dc_ac_ratio_min: f64,
    #[validate(range(min = 0.1, max = 5.0))]
    pub dc_ac_ratio_warn_max: f64,
    #[validate(range(min = 0.1, max = 5.0))]
    pub dc_ac_ratio_fail_max: f64,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            cold_voc_warning_margin_pct: DEFAULT_COLD_VOC_WARNING_MARGIN_PCT,
            standard_drop_limit_pct: DEFAULT_STANDARD_DROP_LIMIT_PCT,
            strict_drop_limit_pct: DEFAULT_STRICT_DROP_LIMIT_PCT,
            high_ambient_temp_c: DEFAULT_HIGH_AMBIENT_TEMP_C,
            dc_ac_ratio_min: DEFAULT_DC_AC_RATIO_MIN,
            dc_ac_ratio_warn_max: DEFAULT_DC_AC_RATIO_WARN_MAX,
            dc_ac_ratio_fail_max: DEFAULT_DC_AC_RATIO_FAIL_MAX,
        }
    }
}

impl RuleThresholds {
    /// Range-check every field, then require the strict drop limit to be no
    /// looser than the standard one and the DC/AC bands to be ordered.
    pub fn check(&self) -> Result<(), CoreError> {
        let fields = [
            ("cold_voc_warning_margin_pct", self.cold_voc_warning_margin_pct),
            ("standard_drop_limit_pct", self.standard_drop_limit_pct),
            ("strict_drop_limit_pct", self.strict_drop_limit_pct),
            ("high_ambient_temp_c", self.high_ambient_temp_c),
            ("dc_ac_ratio_min", self.dc_ac_ratio_min),
            ("dc_ac_ratio_warn_max", self.dc_ac_ratio_warn_max),
            ("dc_ac_ratio_fail_max", self.dc_ac_ratio_fail_max),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(CoreError::Validation(format!(
                "{name} must be a finite number, got {value}"
            )));
        }
        self.validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;
        if self.strict_drop_limit_pct > self.standard_drop_limit_pct {
            return Err(CoreError::Validation(format!(
                "strict_drop_limit_pct ({}) must be <= standard_drop_limit_pct ({})",
                self.strict_drop_limit_pct, self.standard_drop_limit_pct
            )));
        }
        if !(self.dc_ac_ratio_min <= self.dc_ac_ratio_warn_max
            && self.dc_ac_ratio_warn_max <= self.dc_ac_ratio_fail_max)
        {
            return Err(CoreError::Validation(format!(
                "DC/AC ratio bands must satisfy min ({}) <= warn_max ({}) <= fail_max ({})",
                self.dc_ac_ratio_min, self.dc_ac_ratio_warn_max, self.dc_ac_ratio_fail_max
            )));
        }
        Ok(())
    }
}
