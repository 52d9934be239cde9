//! AC cable voltage drop per segment.
//!
//! Each segment is held to the limit of its caller-supplied circuit class.
//! When the sizing sheet omits the computed drop it is derived from the
//! conductor impedance:
//!
//! ```text
//! drop_v   = impedance (mV/A/m) × current (A) × length (m) / 1000
//! drop_pct = drop_v / nominal_voltage × 100
//! ```

use serde::Serialize;

use crate::checks::{require_finite, require_positive};
use crate::error::CoreError;
use crate::finding::{CheckId, ComplianceFinding, Measurement, Severity};
use crate::signals::{AcCableSegment, CircuitClass};
use crate::thresholds::RuleThresholds;

/// Where a segment's drop percentage came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropSource {
    /// Taken from the sizing sheet.
    Reported,
    /// Computed from impedance, current, length and voltage.
    Derived,
}

pub fn limit_for(class: CircuitClass, thresholds: &RuleThresholds) -> f64 {
    match class {
        CircuitClass::Standard => thresholds.standard_drop_limit_pct,
        CircuitClass::Strict => thresholds.strict_drop_limit_pct,
    }
}

/// Derive the drop percentage from conductor data.
pub fn derive_voltage_drop_pct(segment: &AcCableSegment) -> Result<f64, CoreError> {
    let impedance = require_positive(
        segment.conductor.impedance_mv_per_a_m,
        "conductor.impedanceMvPerAM",
    )?;
    let current = require_finite(segment.current, "current")?;
    let length = require_finite(segment.length, "length")?;
    let voltage = require_positive(segment.nominal_voltage, "nominalVoltage")?;
    let drop_v = impedance * current.abs() * length.abs() / 1000.0;
    Ok(drop_v / voltage * 100.0)
}

/// The drop to judge a segment by: the reported value when usable,
/// otherwise the derived one.
pub fn effective_voltage_drop_pct(
    segment: &AcCableSegment,
) -> Result<(f64, DropSource), CoreError> {
    const FIELD: &str = "computedVoltageDropPct";
    match segment.computed_voltage_drop_pct {
        Some(pct) if pct.is_finite() && pct >= 0.0 => Ok((pct, DropSource::Reported)),
        Some(_) => Err(CoreError::MissingField { field: FIELD }),
        None => derive_voltage_drop_pct(segment)
            .map(|pct| (pct, DropSource::Derived))
            .map_err(|_| CoreError::MissingField { field: FIELD }),
    }
}

pub fn check_segment(segment: &AcCableSegment, thresholds: &RuleThresholds) -> ComplianceFinding {
    let id = segment.segment_id.as_str();

    let Some(class) = segment.circuit_class else {
        return ComplianceFinding::missing_fields(CheckId::AcVoltageDrop, &["circuitClass"])
            .with_subject(id);
    };

    let (drop_pct, source) = match effective_voltage_drop_pct(segment) {
        Ok(v) => v,
        Err(CoreError::MissingField { field }) => {
            return ComplianceFinding::missing_fields(CheckId::AcVoltageDrop, &[field])
                .with_subject(id)
                .with_recommendation("Add the voltage drop or conductor impedance to the sizing sheet");
        }
        Err(e) => {
            return ComplianceFinding::new(CheckId::AcVoltageDrop, Severity::Fail, e.to_string())
                .with_subject(id);
        }
    };

    let limit = limit_for(class, thresholds);
    let derived = match source {
        DropSource::Reported => "",
        DropSource::Derived => " (derived from conductor impedance)",
    };
    let observed = Measurement::new(drop_pct, "%");
    let threshold = Measurement::new(limit, "%");

    if drop_pct > limit {
        let mut finding = ComplianceFinding::new(
            CheckId::AcVoltageDrop,
            Severity::Fail,
            format!(
                "{id}: voltage drop {drop_pct:.2} %{derived} exceeds the {} limit of {limit:.2} %",
                class.as_str()
            ),
        )
        .with_subject(id)
        .with_observed(observed)
        .with_threshold(threshold);
        if let Some(size) = segment.conductor.size_mm2 {
            finding = finding.with_recommendation(format!(
                "Increase the conductor size above {size} mm² or shorten the run"
            ));
        } else {
            finding = finding.with_recommendation("Increase the conductor size or shorten the run");
        }
        finding
    } else {
        ComplianceFinding::new(
            CheckId::AcVoltageDrop,
            Severity::Pass,
            format!(
                "{id}: voltage drop {drop_pct:.2} %{derived} is within the {} limit of {limit:.2} %",
                class.as_str()
            ),
        )
        .with_subject(id)
        .with_observed(observed)
        .with_threshold(threshold)
    }
}

/// One finding per segment, in input order.
pub fn check_ac_voltage_drop(
    segments: &[AcCableSegment],
    thresholds: &RuleThresholds,
) -> Vec<ComplianceFinding> {
    segments
        .iter()
        .map(|s| check_segment(s, thresholds))
        .collect()
}
