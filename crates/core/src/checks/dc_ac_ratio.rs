//! DC/AC ratio (SEC best practice).
//!
//! Installed DC capacity over total inverter AC rating. A high ratio clips
//! output at peak irradiance; a low one leaves the inverters underused.

use crate::checks::{require_count, require_positive, MissingFields};
use crate::finding::{CheckId, ComplianceFinding, Measurement, Severity};
use crate::signals::BomSignals;
use crate::thresholds::RuleThresholds;

const UNIT: &str = "DC/AC";

/// Rough share of peak output lost to clipping at `ratio`, capped at 95 %.
pub fn clipping_estimate_pct(ratio: f64) -> f64 {
    ((ratio - 1.0) * 100.0).clamp(0.0, 95.0)
}

pub fn check_dc_ac_ratio(bom: &BomSignals, thresholds: &RuleThresholds) -> ComplianceFinding {
    let mut missing = MissingFields::default();
    let dc_kw = missing.take(require_positive(
        bom.system_capacity_kw,
        "bom.systemCapacityKw",
    ));
    let ac_kw = missing.take(require_positive(
        bom.inverter_ac_power_kw,
        "bom.inverterAcPowerKw",
    ));
    // An unlisted count means a single inverter; an explicit zero is invalid.
    let count = missing.take(require_count(
        Some(bom.inverter_count.unwrap_or(1)),
        "bom.inverterCount",
    ));

    let (Some(dc_kw), Some(ac_kw), Some(count)) = (dc_kw, ac_kw, count) else {
        return ComplianceFinding::missing_fields(CheckId::DcAcRatio, missing.fields());
    };

    let total_ac_kw = ac_kw * f64::from(count);
    let ratio = dc_kw / total_ac_kw;
    let observed = Measurement::new(ratio, UNIT);
    let basis = format!("{dc_kw:.1} kWp DC over {count} × {ac_kw:.1} kW AC");
    let (min, warn_max, fail_max) = (
        thresholds.dc_ac_ratio_min,
        thresholds.dc_ac_ratio_warn_max,
        thresholds.dc_ac_ratio_fail_max,
    );

    if ratio > fail_max {
        ComplianceFinding::new(
            CheckId::DcAcRatio,
            Severity::Fail,
            format!(
                "DC/AC ratio {ratio:.2} ({basis}) exceeds {fail_max:.2}; expect about {:.0} % clipping at peak",
                clipping_estimate_pct(ratio)
            ),
        )
        .with_observed(observed)
        .with_threshold(Measurement::new(fail_max, UNIT))
        .with_recommendation("Use a larger inverter or reduce the module count")
    } else if ratio > warn_max {
        ComplianceFinding::new(
            CheckId::DcAcRatio,
            Severity::Warning,
            format!("DC/AC ratio {ratio:.2} ({basis}) is above the recommended {warn_max:.2}"),
        )
        .with_observed(observed)
        .with_threshold(Measurement::new(warn_max, UNIT))
        .with_recommendation("Consider a larger inverter to limit clipping at peak hours")
    } else if ratio < min {
        ComplianceFinding::new(
            CheckId::DcAcRatio,
            Severity::Warning,
            format!("DC/AC ratio {ratio:.2} ({basis}) is below the recommended {min:.2}"),
        )
        .with_observed(observed)
        .with_threshold(Measurement::new(min, UNIT))
        .with_recommendation("Add modules or use a smaller inverter")
    } else {
        ComplianceFinding::new(
            CheckId::DcAcRatio,
            Severity::Pass,
            format!("DC/AC ratio {ratio:.2} ({basis}) is within {min:.2}-{warn_max:.2}"),
        )
        .with_observed(observed)
        .with_threshold(Measurement::new(warn_max, UNIT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bom(dc_kw: f64, ac_kw: f64, count: Option<u32>) -> BomSignals {
        BomSignals {
            system_capacity_kw: Some(dc_kw),
            inverter_ac_power_kw: Some(ac_kw),
            inverter_count: count,
            ..Default::default()
        }
    }

    fn severity(b: &BomSignals) -> Severity {
        check_dc_ac_ratio(b, &RuleThresholds::default()).severity()
    }

    #[test]
    fn ratio_bands() {
        assert_eq!(severity(&bom(120.0, 100.0, None)), Severity::Pass);
        assert_eq!(severity(&bom(130.0, 100.0, None)), Severity::Pass);
        assert_eq!(severity(&bom(140.0, 100.0, None)), Severity::Warning);
        assert_eq!(severity(&bom(160.0, 100.0, None)), Severity::Fail);
        assert_eq!(severity(&bom(90.0, 100.0, None)), Severity::Warning);
    }

    #[test]
    fn inverter_count_multiplies_ac_rating() {
        // 660 kWp over 5 × 110 kW is 1.2.
        let f = check_dc_ac_ratio(&bom(660.0, 110.0, Some(5)), &RuleThresholds::default());
        assert_eq!(f.severity(), Severity::Pass);
        assert!((f.observed().unwrap().value - 1.2).abs() < 1e-9);
        // Read as a single inverter the same plant would clip badly.
        assert_eq!(severity(&bom(660.0, 110.0, None)), Severity::Fail);
    }

    #[test]
    fn high_ratio_reports_clipping() {
        let f = check_dc_ac_ratio(&bom(170.0, 100.0, Some(1)), &RuleThresholds::default());
        assert!(f.message().contains("about 70 % clipping"));
        assert_eq!(f.threshold().unwrap().value, 1.5);
    }

    #[test]
    fn missing_capacity_fails_naming_field() {
        let mut b = bom(120.0, 100.0, None);
        b.system_capacity_kw = None;
        let f = check_dc_ac_ratio(&b, &RuleThresholds::default());
        assert_eq!(f.severity(), Severity::Fail);
        assert!(f.message().contains("bom.systemCapacityKw"));
    }

    #[test]
    fn zero_inverter_count_is_invalid() {
        let f = check_dc_ac_ratio(&bom(120.0, 100.0, Some(0)), &RuleThresholds::default());
        assert_eq!(f.severity(), Severity::Fail);
        assert!(f.message().contains("bom.inverterCount"));
    }

    #[test]
    fn bands_follow_thresholds() {
        let t = RuleThresholds {
            dc_ac_ratio_warn_max: 1.1,
            ..Default::default()
        };
        assert_eq!(
            check_dc_ac_ratio(&bom(120.0, 100.0, None), &t).severity(),
            Severity::Warning
        );
    }
}
