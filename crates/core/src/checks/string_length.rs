//! String length against the inverter's per-string module limit.

use crate::checks::{require_count, MissingFields};
use crate::finding::{CheckId, ComplianceFinding, Measurement, Severity};
use crate::signals::BomSignals;

pub fn check_string_length(bom: &BomSignals) -> ComplianceFinding {
    let mut missing = MissingFields::default();
    let mps = missing.take(require_count(bom.modules_per_string, "bom.modulesPerString"));
    let max = missing.take(require_count(
        bom.inverter_modules_per_string_max,
        "bom.inverterModulesPerStringMax",
    ));

    let (Some(mps), Some(max)) = (mps, max) else {
        return ComplianceFinding::missing_fields(CheckId::StringLength, missing.fields());
    };

    let observed = Measurement::new(f64::from(mps), "modules");
    let threshold = Measurement::new(f64::from(max), "modules");

    if mps > max {
        ComplianceFinding::new(
            CheckId::StringLength,
            Severity::Fail,
            format!("{mps} modules per string exceeds the inverter limit of {max}"),
        )
        .with_observed(observed)
        .with_threshold(threshold)
        .with_recommendation(format!("Reduce modules per string to at most {max}"))
    } else {
        ComplianceFinding::new(
            CheckId::StringLength,
            Severity::Pass,
            format!("{mps} modules per string is within the inverter limit of {max}"),
        )
        .with_observed(observed)
        .with_threshold(threshold)
    }
}
