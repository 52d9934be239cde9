//! Aggregate counts over a report and AC voltage-drop KPIs.

use serde::Serialize;

use crate::checks::ac_voltage_drop::effective_voltage_drop_pct;
use crate::finding::{ComplianceFinding, Severity};
use crate::signals::{AcCableSegment, CircuitClass};

/// Counts of findings by severity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total: usize,
    pub passed: usize,
    pub warned: usize,
    pub failed: usize,
}

pub fn compute_summary(findings: &[ComplianceFinding]) -> ReportSummary {
    let mut passed = 0usize;
    let mut warned = 0usize;
    let mut failed = 0usize;

    for f in findings {
        match f.severity() {
            Severity::Pass => passed += 1,
            Severity::Warning => warned += 1,
            Severity::Fail => failed += 1,
        }
    }

    ReportSummary {
        total: findings.len(),
        passed,
        warned,
        failed,
    }
}

/// Worst drop and segment count for one circuit class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassDropKpi {
    pub circuit_class: CircuitClass,
    pub segments: usize,
    /// `None` when no segment of the class has a usable drop.
    pub max_drop_pct: Option<f64>,
}

/// Per-class KPIs, `Standard` first then `Strict`.
///
/// Unclassified segments are left out. A segment without a usable drop
/// counts toward `segments` but not toward the maximum.
pub fn ac_voltage_drop_kpis(segments: &[AcCableSegment]) -> Vec<ClassDropKpi> {
    [CircuitClass::Standard, CircuitClass::Strict]
        .into_iter()
        .map(|class| {
            let in_class: Vec<&AcCableSegment> = segments
                .iter()
                .filter(|s| s.circuit_class == Some(class))
                .collect();
            let max_drop_pct = in_class
                .iter()
                .filter_map(|s| effective_voltage_drop_pct(s).ok())
                .map(|(pct, _)| pct)
                .fold(None, |acc: Option<f64>, pct| {
                    Some(acc.map_or(pct, |m| m.max(pct)))
                });
            ClassDropKpi {
                circuit_class: class,
                segments: in_class.len(),
                max_drop_pct,
            }
        })
        .collect()
}
