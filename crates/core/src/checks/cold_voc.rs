//! Cold-weather string overvoltage (IEC 62548).
//!
//! Module Voc rises as cell temperature drops below STC, so the string open
//! circuit voltage at the site's design minimum temperature must stay below
//! the inverter's maximum DC input voltage.

use crate::checks::{require_count, require_finite, require_positive, MissingFields};
use crate::error::CoreError;
use crate::finding::{CheckId, ComplianceFinding, Measurement, Severity};
use crate::signals::BomSignals;
use crate::site::SiteContext;
use crate::thresholds::RuleThresholds;

/// Standard test condition cell temperature (°C).
pub const STC_REF_TEMP_C: f64 = 25.0;

/// Module Voc at `temp_c` under the linear temperature-coefficient model.
///
/// `temp_coeff_pct` is in %/°C.
pub fn module_voc_at(module_voc: f64, temp_coeff_pct: f64, temp_c: f64) -> f64 {
    module_voc * (1.0 + temp_coeff_pct / 100.0 * (temp_c - STC_REF_TEMP_C))
}

/// Largest whole number of modules whose combined voltage stays at or under
/// `limit_v`, never less than one.
pub fn max_modules_within(limit_v: f64, voc_per_module: f64) -> u32 {
    if voc_per_module <= 0.0 || limit_v <= 0.0 {
        return 1;
    }
    (limit_v / voc_per_module).floor().clamp(1.0, f64::from(u32::MAX)) as u32
}

/// Intermediate values of the cold-weather calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColdVocCalculation {
    pub voc_cold_per_module: f64,
    pub string_voc_cold: f64,
    pub margin_v: f64,
    pub margin_pct: f64,
}

pub fn calculate(
    module_voc: f64,
    temp_coeff_pct: f64,
    modules_per_string: u32,
    tmin_c: f64,
    inverter_vmax_dc: f64,
) -> ColdVocCalculation {
    let voc_cold_per_module = module_voc_at(module_voc, temp_coeff_pct, tmin_c);
    let string_voc_cold = voc_cold_per_module * f64::from(modules_per_string);
    let margin_v = inverter_vmax_dc - string_voc_cold;
    ColdVocCalculation {
        voc_cold_per_module,
        string_voc_cold,
        margin_v,
        margin_pct: margin_v / inverter_vmax_dc * 100.0,
    }
}

/// A Voc coefficient must be finite and not positive.
pub(crate) fn require_voc_coefficient(value: Option<f64>) -> Result<f64, CoreError> {
    const FIELD: &str = "bom.moduleTempCoeffVoc";
    match require_finite(value, FIELD)? {
        c if c <= 0.0 => Ok(c),
        _ => Err(CoreError::MissingField { field: FIELD }),
    }
}

pub fn check_cold_weather_voc(
    bom: &BomSignals,
    site: &SiteContext,
    thresholds: &RuleThresholds,
) -> ComplianceFinding {
    let mut missing = MissingFields::default();
    let voc = missing.take(require_positive(bom.module_voc, "bom.moduleVoc"));
    let coeff = missing.take(require_voc_coefficient(bom.module_temp_coeff_voc));
    let mps = missing.take(require_count(bom.modules_per_string, "bom.modulesPerString"));
    let vmax = missing.take(require_positive(bom.inverter_vmax_dc, "bom.inverterVmaxDc"));

    let (Some(voc), Some(coeff), Some(mps), Some(vmax)) = (voc, coeff, mps, vmax) else {
        return ComplianceFinding::missing_fields(CheckId::ColdWeatherVoc, missing.fields())
            .with_recommendation("Verify module Voc and temperature coefficient on the datasheet");
    };

    let tmin = site.tmin_c();
    let calc = calculate(voc, coeff, mps, tmin, vmax);
    let observed = Measurement::new(calc.string_voc_cold, "V");
    let threshold = Measurement::new(vmax, "V");

    if calc.string_voc_cold > vmax {
        let safe = max_modules_within(vmax, calc.voc_cold_per_module);
        let reduce = if safe < mps {
            format!("Reduce modules per string from {mps} to {safe}")
        } else {
            "A single module exceeds the inverter DC max at Tmin; choose a different module or inverter"
                .to_string()
        };
        return ComplianceFinding::new(
            CheckId::ColdWeatherVoc,
            Severity::Fail,
            format!(
                "String Voc at {tmin:.1} °C is {:.1} V, exceeding inverter DC max {vmax:.0} V by {:.1} V",
                calc.string_voc_cold, -calc.margin_v
            ),
        )
        .with_observed(observed)
        .with_threshold(threshold)
        .with_recommendation(reduce)
        .with_recommendation("Consider an inverter with a higher DC voltage rating");
    }

    let margin_pct_limit = thresholds.cold_voc_warning_margin_pct;
    if calc.margin_pct < margin_pct_limit {
        let with_margin = max_modules_within(
            vmax * (1.0 - margin_pct_limit / 100.0),
            calc.voc_cold_per_module,
        );
        return ComplianceFinding::new(
            CheckId::ColdWeatherVoc,
            Severity::Warning,
            format!(
                "String Voc at {tmin:.1} °C is {:.1} V; margin to inverter DC max {vmax:.0} V is {:.1} V ({:.1} %), below the {margin_pct_limit:.1} % recommended",
                calc.string_voc_cold, calc.margin_v, calc.margin_pct
            ),
        )
        .with_observed(observed)
        .with_threshold(threshold)
        .with_recommendation(format!(
            "Consider {with_margin} modules per string to restore a {margin_pct_limit:.1} % margin"
        ));
    }

    ComplianceFinding::new(
        CheckId::ColdWeatherVoc,
        Severity::Pass,
        format!(
            "String Voc at {tmin:.1} °C is {:.1} V, within inverter DC max {vmax:.0} V ({:.1} % margin)",
            calc.string_voc_cold, calc.margin_pct
        ),
    )
    .with_observed(observed)
    .with_threshold(threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::{GeoPoint, TminSource};

    fn site(tmin: f64) -> SiteContext {
        SiteContext::new(
            GeoPoint {
                lat: 24.7,
                lon: 46.7,
            },
            tmin,
            45.0,
            TminSource::Manual,
        )
        .unwrap()
    }

    fn bom(vmax: f64) -> BomSignals {
        BomSignals {
            inverter_vmax_dc: Some(vmax),
            module_voc: Some(45.0),
            module_temp_coeff_voc: Some(-0.29),
            modules_per_string: Some(10),
            inverter_modules_per_string_max: Some(12),
            ..Default::default()
        }
    }

    #[test]
    fn worked_example_passes() {
        let calc = calculate(45.0, -0.29, 10, 5.0, 600.0);
        assert!((calc.string_voc_cold - 476.1).abs() < 1e-9);

        let f = check_cold_weather_voc(&bom(600.0), &site(5.0), &RuleThresholds::default());
        assert_eq!(f.severity(), Severity::Pass);
        assert!((f.observed().unwrap().value - 476.1).abs() < 1e-9);
        assert_eq!(f.threshold().unwrap().value, 600.0);
    }

    #[test]
    fn worked_example_fails_at_450() {
        let f = check_cold_weather_voc(&bom(450.0), &site(5.0), &RuleThresholds::default());
        assert_eq!(f.severity(), Severity::Fail);
        assert!(f.message().contains("476.1 V"));
        // 450 / (45 * 1.058) = 9.45
        assert!(f.recommendations()[0].contains("from 10 to 9"));
    }

    #[test]
    fn tight_margin_warns() {
        // 476.1 V against 490 V is a 2.8 % margin.
        let f = check_cold_weather_voc(&bom(490.0), &site(5.0), &RuleThresholds::default());
        assert_eq!(f.severity(), Severity::Warning);
        assert!(f.recommendations()[0].contains("9 modules per string"));
    }

    #[test]
    fn margin_threshold_is_configurable() {
        let thresholds = RuleThresholds {
            cold_voc_warning_margin_pct: 2.0,
            ..Default::default()
        };
        let f = check_cold_weather_voc(&bom(490.0), &site(5.0), &thresholds);
        assert_eq!(f.severity(), Severity::Pass);
    }

    #[test]
    fn exactly_at_limit_is_not_a_failure() {
        let f = check_cold_weather_voc(&bom(450.0), &site(25.0), &RuleThresholds::default());
        assert_eq!(f.severity(), Severity::Warning);
    }

    #[test]
    fn missing_module_voc_fails_naming_field() {
        let mut b = bom(600.0);
        b.module_voc = None;
        let f = check_cold_weather_voc(&b, &site(5.0), &RuleThresholds::default());
        assert_eq!(f.severity(), Severity::Fail);
        assert!(f.message().contains("moduleVoc"));
        assert!(f.observed().is_none());
    }

    #[test]
    fn positive_coefficient_is_rejected() {
        let mut b = bom(600.0);
        b.module_temp_coeff_voc = Some(0.29);
        let f = check_cold_weather_voc(&b, &site(5.0), &RuleThresholds::default());
        assert_eq!(f.severity(), Severity::Fail);
        assert!(f.message().contains("bom.moduleTempCoeffVoc"));
    }

    #[test]
    fn max_modules_within_floors() {
        assert_eq!(max_modules_within(1100.0, 52.0), 21);
        assert_eq!(max_modules_within(1100.0, 0.0), 1);
        assert_eq!(max_modules_within(40.0, 52.0), 1);
    }

    #[test]
    fn single_module_over_limit_does_not_advise_zero() {
        let b = BomSignals {
            modules_per_string: Some(1),
            ..bom(40.0)
        };
        let f = check_cold_weather_voc(&b, &site(5.0), &RuleThresholds::default());
        assert_eq!(f.severity(), Severity::Fail);
        assert!(f.recommendations()[0].contains("single module exceeds"));
        assert!(f.recommendations().iter().all(|r| !r.contains("to 0")));
    }
}
