//! BoM vs SLD consistency.
//!
//! The BoM and the single line diagram describe the same inverter
//! configuration, so the DC input limit and the string length must agree
//! exactly.

use crate::checks::{require_count, require_positive, MissingFields};
use crate::error::CoreError;
use crate::finding::{CheckId, ComplianceFinding, Measurement, Severity};
use crate::signals::{BomSignals, SldSignals};

pub fn check_bom_vs_sld(bom: &BomSignals, sld: &SldSignals) -> ComplianceFinding {
    let mut missing = MissingFields::default();
    let bom_vmax = missing.take(require_positive(bom.inverter_vmax_dc, "bom.inverterVmaxDc"));
    let sld_vmax = missing.take(require_positive(sld.inverter_vmax_dc, "sld.inverterVmaxDc"));
    let bom_mps = missing.take(require_count(bom.modules_per_string, "bom.modulesPerString"));
    let sld_mps = missing.take(require_count(sld.modules_per_string, "sld.modulesPerString"));

    let (Some(bom_vmax), Some(sld_vmax), Some(bom_mps), Some(sld_mps)) =
        (bom_vmax, sld_vmax, bom_mps, sld_mps)
    else {
        return ComplianceFinding::missing_fields(CheckId::BomVsSld, missing.fields())
            .with_recommendation("Confirm the field is legible on both the BoM and the SLD");
    };

    let mismatches = mismatched_fields(bom_vmax, sld_vmax, bom_mps, sld_mps);
    let observed = Measurement::new(mismatches.len() as f64, "mismatched fields");
    let threshold = Measurement::new(0.0, "mismatched fields");

    if mismatches.is_empty() {
        return ComplianceFinding::new(
            CheckId::BomVsSld,
            Severity::Pass,
            format!(
                "BoM and SLD agree: inverter DC max {bom_vmax:.0} V, {bom_mps} modules per string"
            ),
        )
        .with_observed(observed)
        .with_threshold(threshold);
    }

    let err = CoreError::InconsistentSignals(
        mismatches
            .iter()
            .map(|m| m.to_string())
            .collect::<Vec<_>>()
            .join("; "),
    );
    ComplianceFinding::new(CheckId::BomVsSld, Severity::Fail, err.to_string())
        .with_observed(observed)
        .with_threshold(threshold)
        .with_recommendation("Reconcile the BoM and SLD so both record the same design intent")
}

enum Mismatch {
    InverterVmaxDc { bom: f64, sld: f64 },
    ModulesPerString { bom: u32, sld: u32 },
}

impl std::fmt::Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InverterVmaxDc { bom, sld } => {
                write!(f, "inverterVmaxDc differs: BoM {bom} V, SLD {sld} V")
            }
            Self::ModulesPerString { bom, sld } => {
                write!(f, "modulesPerString differs: BoM {bom}, SLD {sld}")
            }
        }
    }
}

#[allow(clippy::float_cmp)]
fn mismatched_fields(bom_vmax: f64, sld_vmax: f64, bom_mps: u32, sld_mps: u32) -> Vec<Mismatch> {
    let mut out = Vec::new();
    if bom_vmax != sld_vmax {
        out.push(Mismatch::InverterVmaxDc {
            bom: bom_vmax,
            sld: sld_vmax,
        });
    }
    if bom_mps != sld_mps {
        out.push(Mismatch::ModulesPerString {
            bom: bom_mps,
            sld: sld_mps,
        });
    }
    out
}
