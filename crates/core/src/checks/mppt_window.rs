//! String Vmp against the inverter MPPT window (IEC 62109).
//!
//! On hot days the string Vmp sags and may fall below the tracker's minimum;
//! on cold mornings it rises and may exceed the maximum. Either way the
//! inverter leaves the maximum power point and energy is lost, so both cases
//! are warnings rather than failures. Vmp is scaled with the module's Voc
//! temperature coefficient.

use crate::checks::cold_voc::{module_voc_at, require_voc_coefficient};
use crate::checks::{require_count, require_positive, MissingFields};
use crate::finding::{CheckId, ComplianceFinding, Measurement, Severity};
use crate::signals::BomSignals;
use crate::site::SiteContext;

/// String Vmp at both design temperature extremes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MpptWindowCalculation {
    pub vmp_per_module_at_tmax: f64,
    pub string_vmp_at_tmax: f64,
    pub string_vmp_at_tmin: f64,
}

pub fn calculate(
    module_vmp: f64,
    temp_coeff_pct: f64,
    modules_per_string: u32,
    tmin_c: f64,
    tmax_c: f64,
) -> MpptWindowCalculation {
    let n = f64::from(modules_per_string);
    let vmp_per_module_at_tmax = module_voc_at(module_vmp, temp_coeff_pct, tmax_c);
    MpptWindowCalculation {
        vmp_per_module_at_tmax,
        string_vmp_at_tmax: vmp_per_module_at_tmax * n,
        string_vmp_at_tmin: module_voc_at(module_vmp, temp_coeff_pct, tmin_c) * n,
    }
}

pub fn check_mppt_window(bom: &BomSignals, site: &SiteContext) -> ComplianceFinding {
    let mut missing = MissingFields::default();
    let vmp = missing.take(require_positive(bom.module_vmp, "bom.moduleVmp"));
    let coeff = missing.take(require_voc_coefficient(bom.module_temp_coeff_voc));
    let mps = missing.take(require_count(bom.modules_per_string, "bom.modulesPerString"));
    let mppt_min = missing.take(require_positive(
        bom.inverter_mppt_min_v,
        "bom.inverterMpptMinV",
    ));
    let mppt_max = missing.take(require_positive(
        bom.inverter_mppt_max_v,
        "bom.inverterMpptMaxV",
    ));

    let (Some(vmp), Some(coeff), Some(mps), Some(mppt_min), Some(mppt_max)) =
        (vmp, coeff, mps, mppt_min, mppt_max)
    else {
        return ComplianceFinding::missing_fields(CheckId::MpptWindow, missing.fields());
    };

    if mppt_min >= mppt_max {
        return ComplianceFinding::new(
            CheckId::MpptWindow,
            Severity::Fail,
            format!(
                "Inverter MPPT window is inconsistent: minimum {mppt_min:.0} V is not below maximum {mppt_max:.0} V"
            ),
        )
        .with_recommendation("Verify the MPPT voltage range on the inverter datasheet");
    }

    let (tmin, tmax) = (site.tmin_c(), site.tmax_c());
    let calc = calculate(vmp, coeff, mps, tmin, tmax);
    let below = calc.string_vmp_at_tmax < mppt_min;
    let above = calc.string_vmp_at_tmin > mppt_max;

    if !below && !above {
        return ComplianceFinding::new(
            CheckId::MpptWindow,
            Severity::Pass,
            format!(
                "String Vmp stays within the MPPT window {mppt_min:.0}-{mppt_max:.0} V: {:.1} V at {tmax:.1} °C, {:.1} V at {tmin:.1} °C",
                calc.string_vmp_at_tmax, calc.string_vmp_at_tmin
            ),
        )
        .with_observed(Measurement::new(calc.string_vmp_at_tmax, "V"))
        .with_threshold(Measurement::new(mppt_min, "V"));
    }

    let mut parts = Vec::new();
    if below {
        parts.push(format!(
            "string Vmp at {tmax:.1} °C is {:.1} V, below the MPPT minimum {mppt_min:.0} V",
            calc.string_vmp_at_tmax
        ));
    }
    if above {
        parts.push(format!(
            "string Vmp at {tmin:.1} °C is {:.1} V, above the MPPT maximum {mppt_max:.0} V",
            calc.string_vmp_at_tmin
        ));
    }
    let mut message = parts.join("; ");
    if let Some(first) = message.get_mut(..1) {
        first.make_ascii_uppercase();
    }

    let (observed, threshold) = if below {
        (calc.string_vmp_at_tmax, mppt_min)
    } else {
        (calc.string_vmp_at_tmin, mppt_max)
    };
    let mut finding = ComplianceFinding::new(CheckId::MpptWindow, Severity::Warning, message)
        .with_observed(Measurement::new(observed, "V"))
        .with_threshold(Measurement::new(threshold, "V"));

    if below {
        let needed = (mppt_min / calc.vmp_per_module_at_tmax).ceil();
        finding = finding.with_recommendation(format!(
            "Use at least {needed:.0} modules per string or an inverter with a lower MPPT minimum"
        ));
    }
    if above {
        finding = finding.with_recommendation("Reduce modules per string");
    }
    finding
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::{GeoPoint, TminSource};

    fn site(tmin: f64, tmax: f64) -> SiteContext {
        SiteContext::new(
            GeoPoint {
                lat: 24.7,
                lon: 46.7,
            },
            tmin,
            tmax,
            TminSource::Manual,
        )
        .unwrap()
    }

    fn bom(mps: u32, mppt_min: f64, mppt_max: f64) -> BomSignals {
        BomSignals {
            module_vmp: Some(41.0),
            module_temp_coeff_voc: Some(-0.29),
            modules_per_string: Some(mps),
            inverter_mppt_min_v: Some(mppt_min),
            inverter_mppt_max_v: Some(mppt_max),
            ..Default::default()
        }
    }

    #[test]
    fn string_inside_window_passes() {
        // 41 V × 20 = 820 V at STC; 760.6 V at 50 °C, 891.3 V at -5 °C.
        let f = check_mppt_window(&bom(20, 500.0, 950.0), &site(-5.0, 50.0));
        assert_eq!(f.severity(), Severity::Pass);
        assert!((f.observed().unwrap().value - 760.55).abs() < 1e-6);
    }

    #[test]
    fn short_string_sags_below_minimum_when_hot() {
        let f = check_mppt_window(&bom(12, 500.0, 950.0), &site(-5.0, 50.0));
        assert_eq!(f.severity(), Severity::Warning);
        assert!(f.message().starts_with("String Vmp at 50.0 °C"));
        assert_eq!(f.threshold().unwrap().value, 500.0);
        // 500 / (41 × 0.9275) = 13.15
        assert!(f.recommendations()[0].contains("at least 14 modules"));
    }

    #[test]
    fn long_string_exceeds_maximum_when_cold() {
        let f = check_mppt_window(&bom(24, 500.0, 950.0), &site(-5.0, 50.0));
        assert_eq!(f.severity(), Severity::Warning);
        assert!(f.message().contains("above the MPPT maximum"));
        assert_eq!(f.threshold().unwrap().value, 950.0);
        assert_eq!(f.recommendations().len(), 1);
        assert_eq!(f.recommendations()[0], "Reduce modules per string");
    }

    #[test]
    fn missing_mppt_range_fails_naming_fields() {
        let mut b = bom(20, 500.0, 950.0);
        b.inverter_mppt_min_v = None;
        b.module_vmp = None;
        let f = check_mppt_window(&b, &site(-5.0, 50.0));
        assert_eq!(f.severity(), Severity::Fail);
        assert!(f.message().contains("bom.moduleVmp, bom.inverterMpptMinV"));
    }

    #[test]
    fn inverted_window_fails() {
        let f = check_mppt_window(&bom(20, 950.0, 500.0), &site(-5.0, 50.0));
        assert_eq!(f.severity(), Severity::Fail);
        assert!(f.message().contains("inconsistent"));
    }
}
