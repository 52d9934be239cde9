//! Standards compliance snapshot for the report cover page.
//!
//! Summarises a report as the IEC 62548 / SEC points it satisfies and the
//! gaps a reviewer still has to close by hand.

use serde::Serialize;

use crate::finding::{CheckId, ComplianceReport, Severity};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandardsSnapshot {
    pub compliant: Vec<String>,
    pub gaps: Vec<String>,
}

/// Items no check covers yet; always listed as gaps.
const MANUAL_REVIEW_GAPS: &[&str] = &[
    "DC cable sizing verification is not automated",
    "Grounding coordination requires manual review",
];

pub fn standards_snapshot(report: &ComplianceReport) -> StandardsSnapshot {
    let mut compliant = Vec::new();
    let mut gaps = Vec::new();

    let worst = |check: CheckId| report.by_check(check).map(|f| f.severity()).max();

    match worst(CheckId::ColdWeatherVoc) {
        Some(Severity::Pass) => {
            compliant.push("String sizing within inverter DC voltage limits (IEC 62548)".to_string());
            compliant.push("Module Voc temperature coefficient applied at site Tmin".to_string());
        }
        Some(Severity::Warning) => {
            compliant.push("String Voc at Tmin below inverter DC max (IEC 62548)".to_string());
            gaps.push("Cold-weather voltage margin is below the recommended value".to_string());
        }
        _ => gaps.push("String Voc at Tmin may exceed inverter DC max (IEC 62548)".to_string()),
    }

    match worst(CheckId::BomVsSld) {
        Some(Severity::Pass) => compliant.push("BoM and SLD documents are consistent".to_string()),
        _ => gaps.push("BoM and SLD show discrepancies; verify design intent".to_string()),
    }

    match worst(CheckId::StringLength) {
        Some(Severity::Pass) => {
            compliant.push("String length within inverter datasheet limit".to_string())
        }
        _ => gaps.push("String length exceeds or lacks the inverter datasheet limit".to_string()),
    }

    if worst(CheckId::HighAmbientTemperature) == Some(Severity::Warning) {
        gaps.push("High ambient temperature: confirm equipment derating".to_string());
    }

    match worst(CheckId::MpptWindow) {
        Some(Severity::Pass) => {
            compliant.push("String Vmp within inverter MPPT window at Tmin and Tmax".to_string())
        }
        Some(Severity::Warning) => {
            gaps.push("String Vmp leaves the MPPT window at design temperatures".to_string())
        }
        _ => gaps.push("MPPT window could not be verified".to_string()),
    }

    match worst(CheckId::DcAcRatio) {
        Some(Severity::Pass) => compliant.push("DC/AC ratio within SEC recommended range".to_string()),
        Some(Severity::Warning) => {
            gaps.push("DC/AC ratio outside the recommended range".to_string())
        }
        _ => gaps.push("DC/AC ratio exceeds the SEC limit or could not be verified".to_string()),
    }

    let ac_segments = report.by_check(CheckId::AcVoltageDrop).count();
    let ac_failed = report
        .by_check(CheckId::AcVoltageDrop)
        .filter(|f| f.severity() == Severity::Fail)
        .count();
    if ac_segments == 0 {
        gaps.push("No AC cable sizing data supplied".to_string());
    } else if ac_failed == 0 {
        compliant.push(format!(
            "AC voltage drop within SEC limits on all {ac_segments} segments"
        ));
    } else {
        gaps.push(format!(
            "AC voltage drop exceeds limits on {ac_failed} of {ac_segments} segments"
        ));
    }

    gaps.extend(MANUAL_REVIEW_GAPS.iter().map(|s| s.to_string()));

    StandardsSnapshot { compliant, gaps }
}
