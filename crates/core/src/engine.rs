//! Compliance rule engine: runs every check and assembles the report.
//!
//! Stateless: the same inputs always yield the same report. Checks are
//! fault-isolated, so a missing field in one signal set only fails the checks
//! that need it, and a report is always produced.

use std::any::Any;

use serde::Serialize;

use crate::checks::{
    check_ac_voltage_drop, check_bom_vs_sld, check_cold_weather_voc, check_dc_ac_ratio,
    check_high_ambient_temperature, check_mppt_window, check_string_length,
};
use crate::error::CoreError;
use crate::finding::{CheckId, ComplianceFinding, ComplianceReport, Severity};
use crate::signals::{AcCableSegment, BomSignals, SldSignals};
use crate::site::SiteContext;
use crate::thresholds::RuleThresholds;

/// Everything the engine reads for one project review.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewSignals {
    pub site: SiteContext,
    pub bom: BomSignals,
    pub sld: SldSignals,
    pub ac_segments: Vec<AcCableSegment>,
}

/// Run a single check. Every check yields one finding except
/// [`CheckId::AcVoltageDrop`], which yields one per segment.
pub fn evaluate(
    check: CheckId,
    signals: &ReviewSignals,
    thresholds: &RuleThresholds,
) -> Vec<ComplianceFinding> {
    match check {
        CheckId::BomVsSld => vec![check_bom_vs_sld(&signals.bom, &signals.sld)],
        CheckId::ColdWeatherVoc => vec![check_cold_weather_voc(
            &signals.bom,
            &signals.site,
            thresholds,
        )],
        CheckId::StringLength => vec![check_string_length(&signals.bom)],
        CheckId::HighAmbientTemperature => {
            vec![check_high_ambient_temperature(&signals.site, thresholds)]
        }
        CheckId::MpptWindow => vec![check_mppt_window(&signals.bom, &signals.site)],
        CheckId::DcAcRatio => vec![check_dc_ac_ratio(&signals.bom, thresholds)],
        CheckId::AcVoltageDrop => check_ac_voltage_drop(&signals.ac_segments, thresholds),
    }
}

/// Run every check in declaration order.
pub fn run_all_checks(signals: &ReviewSignals, thresholds: &RuleThresholds) -> ComplianceReport {
    let findings: Vec<ComplianceFinding> = CheckId::ALL
        .iter()
        .flat_map(|&check| evaluate(check, signals, thresholds))
        .collect();
    finish(findings)
}

/// Run every check on its own scoped thread.
///
/// Results are joined in declaration order, so the report is identical to
/// [`run_all_checks`]. A check whose thread panics yields a single failing
/// finding instead of tearing down the run.
pub fn run_all_checks_parallel(
    signals: &ReviewSignals,
    thresholds: &RuleThresholds,
) -> ComplianceReport {
    let findings = std::thread::scope(|scope| {
        let handles: Vec<_> = CheckId::ALL
            .iter()
            .map(|&check| {
                (
                    check,
                    scope.spawn(move || evaluate(check, signals, thresholds)),
                )
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|(check, handle)| joined_or_failed(check, handle.join()))
            .collect::<Vec<_>>()
    });
    finish(findings)
}

fn joined_or_failed(
    check: CheckId,
    joined: Result<Vec<ComplianceFinding>, Box<dyn Any + Send>>,
) -> Vec<ComplianceFinding> {
    joined.unwrap_or_else(|payload| {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        tracing::error!(check = check.as_str(), %reason, "Check thread panicked");
        vec![ComplianceFinding::new(
            check,
            Severity::Fail,
            "Check could not be evaluated due to an internal error",
        )
        .with_recommendation("Re-run the review and report the failure if it persists")]
    })
}

fn finish(findings: Vec<ComplianceFinding>) -> ComplianceReport {
    let report = ComplianceReport::from_findings(findings);
    let summary = report.summary();
    tracing::debug!(
        total = summary.total,
        passed = summary.passed,
        warned = summary.warned,
        failed = summary.failed,
        "Compliance checks complete"
    );
    report
}

/// Engine bound to a validated set of thresholds.
#[derive(Debug, Clone, Default)]
pub struct ComplianceEngine {
    thresholds: RuleThresholds,
}

impl ComplianceEngine {
    /// Reject invalid thresholds up front so every run uses sane limits.
    pub fn new(thresholds: RuleThresholds) -> Result<Self, CoreError> {
        thresholds.check()?;
        Ok(Self { thresholds })
    }

    pub fn thresholds(&self) -> &RuleThresholds {
        &self.thresholds
    }

    pub fn run(&self, signals: &ReviewSignals) -> ComplianceReport {
        run_all_checks(signals, &self.thresholds)
    }

    pub fn run_parallel(&self, signals: &ReviewSignals) -> ComplianceReport {
        run_all_checks_parallel(signals, &self.thresholds)
    }
}
