//! High ambient temperature derating advisory.

use crate::finding::{CheckId, ComplianceFinding, Measurement, Severity};
use crate::site::SiteContext;
use crate::thresholds::RuleThresholds;

/// Warns when the site's design maximum exceeds the derating threshold.
/// Never fails: high heat reduces output rather than endangering equipment.
pub fn check_high_ambient_temperature(
    site: &SiteContext,
    thresholds: &RuleThresholds,
) -> ComplianceFinding {
    let tmax = site.tmax_c();
    let limit = thresholds.high_ambient_temp_c;
    let observed = Measurement::new(tmax, "°C");
    let threshold = Measurement::new(limit, "°C");

    if tmax > limit {
        ComplianceFinding::new(
            CheckId::HighAmbientTemperature,
            Severity::Warning,
            format!("Design maximum temperature {tmax:.1} °C exceeds {limit:.1} °C"),
        )
        .with_observed(observed)
        .with_threshold(threshold)
        .with_recommendation("Verify inverter and cable temperature ratings and apply derating")
    } else {
        ComplianceFinding::new(
            CheckId::HighAmbientTemperature,
            Severity::Pass,
            format!("Design maximum temperature {tmax:.1} °C is within {limit:.1} °C"),
        )
        .with_observed(observed)
        .with_threshold(threshold)
    }
}
