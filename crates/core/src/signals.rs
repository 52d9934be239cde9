//! Typed signals extracted from the design documents.
//!
//! Every numeric field is optional: the extractor may fail to find or parse
//! it, and each check turns a missing field into a failing finding instead of
//! aborting the review.

use serde::{Deserialize, Serialize};

/// Signals read from the bill of materials.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BomSignals {
    /// Inverter maximum DC input voltage (V).
    pub inverter_vmax_dc: Option<f64>,
    /// Module open-circuit voltage at STC (V).
    pub module_voc: Option<f64>,
    /// Voc temperature coefficient in %/°C (negative for crystalline modules).
    pub module_temp_coeff_voc: Option<f64>,
    pub modules_per_string: Option<u32>,
    /// Longest string the inverter datasheet allows.
    pub inverter_modules_per_string_max: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inverter_model: Option<String>,
    /// Module maximum-power-point voltage at STC (V).
    #[serde(default)]
    pub module_vmp: Option<f64>,
    /// Inverter MPPT operating window (V).
    #[serde(default)]
    pub inverter_mppt_min_v: Option<f64>,
    #[serde(default)]
    pub inverter_mppt_max_v: Option<f64>,
    /// Installed DC capacity (kWp).
    #[serde(default)]
    pub system_capacity_kw: Option<f64>,
    /// Rated AC output of one inverter (kW).
    #[serde(default)]
    pub inverter_ac_power_kw: Option<f64>,
    /// Number of inverters of the listed model; one when unset.
    #[serde(default)]
    pub inverter_count: Option<u32>,
}

/// The same configuration as recorded on the single line diagram.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SldSignals {
    pub inverter_vmax_dc: Option<f64>,
    pub modules_per_string: Option<u32>,
}

/// Voltage-drop limit category of an AC cable run, supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitClass {
    /// Branch and feeder runs (inverter to combiner).
    Standard,
    /// Runs held to the tighter limit (combiner to main distribution board).
    Strict,
}

impl CircuitClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Strict => "strict",
        }
    }
}

/// Conductor data for one cable run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConductorSpec {
    pub size_mm2: Option<f64>,
    pub cable_type: Option<String>,
    /// Conductor impedance at operating temperature (mV/A/m).
    pub impedance_mv_per_a_m: Option<f64>,
}

/// One AC cable segment from the cable sizing sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcCableSegment {
    pub segment_id: String,
    pub nominal_voltage: Option<f64>,
    /// Design current (A).
    pub current: Option<f64>,
    /// Run length (m).
    pub length: Option<f64>,
    #[serde(default)]
    pub conductor: ConductorSpec,
    pub computed_voltage_drop_pct: Option<f64>,
    pub circuit_class: Option<CircuitClass>,
}

impl AcCableSegment {
    /// A segment with only an id; every measurement is absent.
    pub fn new(segment_id: impl Into<String>) -> Self {
        Self {
            segment_id: segment_id.into(),
            nominal_voltage: None,
            current: None,
            length: None,
            conductor: ConductorSpec::default(),
            computed_voltage_drop_pct: None,
            circuit_class: None,
        }
    }
}
