//! AC cable sizing rows to [`AcCableSegment`]s.

use serde_json::Value;

use super::{find_field, number_field, parse_number, parse_text, Extraction, ExtractionNote, Record};
use crate::signals::{AcCableSegment, CircuitClass, ConductorSpec};

const SOURCE: &str = "ac_cable";

const ID_ALIASES: &[&str] = &["segmentId", "Segment", "Run", "Cable_Run"];
const VOLTAGE_ALIASES: &[&str] = &["nominalVoltage", "Voltage (V)", "V_nominal", "Voltage"];
const CURRENT_ALIASES: &[&str] = &["current", "I max (A)", "Current_A", "Imax"];
const LENGTH_ALIASES: &[&str] = &["length", "Length (m)", "Length_m"];
const SIZE_ALIASES: &[&str] = &["sizeMm2", "cable size", "Cable_Size_mm2"];
const TYPE_ALIASES: &[&str] = &["cableType", "Type Cable"];
const IMPEDANCE_ALIASES: &[&str] = &["impedanceMvPerAM", "Impedance [90 oC]", "Impedance"];
const DROP_ALIASES: &[&str] = &[
    "computedVoltageDropPct",
    "Voltage Drop(%)",
    "Voltage_Drop_Pct",
    "VD_pct",
];
const CLASS_ALIASES: &[&str] = &["circuitClass", "class", "role"];

/// Map a caller-supplied class label onto a [`CircuitClass`].
pub fn parse_circuit_class(label: &str) -> Option<CircuitClass> {
    match super::normalize_key(label).as_str() {
        "standard" | "branch" | "feeder" | "invertertocombiner" => Some(CircuitClass::Standard),
        "strict" | "sensitive" | "combinertomdb" => Some(CircuitClass::Strict),
        _ => None,
    }
}

fn optional_number(
    record: &Record,
    aliases: &[&str],
    field: &str,
    notes: &mut Vec<ExtractionNote>,
) -> Option<f64> {
    let (key, value) = find_field(record, aliases)?;
    let parsed = parse_number(value);
    if parsed.is_none() {
        notes.push(ExtractionNote::new(
            SOURCE,
            field,
            format!("column '{key}' is not numeric: {value}"),
        ));
    }
    parsed
}

fn class_field(record: &Record, id: &str, notes: &mut Vec<ExtractionNote>) -> Option<CircuitClass> {
    let label = match find_field(record, CLASS_ALIASES) {
        Some((_, Value::String(s))) => s.as_str(),
        Some((_, other)) => {
            notes.push(ExtractionNote::new(
                SOURCE,
                format!("{id}.circuitClass"),
                format!("not a label: {other}"),
            ));
            return None;
        }
        None => {
            notes.push(ExtractionNote::new(SOURCE, format!("{id}.circuitClass"), "not found"));
            return None;
        }
    };
    let class = parse_circuit_class(label);
    if class.is_none() {
        notes.push(ExtractionNote::new(
            SOURCE,
            format!("{id}.circuitClass"),
            format!("unknown class '{label}'"),
        ));
    }
    class
}

fn extract_segment(
    row: &Record,
    index: usize,
    notes: &mut Vec<ExtractionNote>,
) -> Option<AcCableSegment> {
    let Some(segment_id) = find_field(row, ID_ALIASES).and_then(|(_, v)| parse_text(v)) else {
        notes.push(ExtractionNote::new(
            SOURCE,
            format!("row {index}"),
            "skipped: no segment id",
        ));
        return None;
    };

    // Conductor data and the electrical quantities only matter when the sheet
    // lacks a computed drop, so their absence is not worth a note.
    let mut row_notes = Vec::new();
    let drop_field = format!("{segment_id}.computedVoltageDropPct");
    let computed_voltage_drop_pct =
        number_field(row, DROP_ALIASES, SOURCE, &drop_field, &mut row_notes);

    let mut number = |aliases: &[&str], name: &str| {
        optional_number(row, aliases, &format!("{segment_id}.{name}"), &mut row_notes)
    };
    let nominal_voltage = number(VOLTAGE_ALIASES, "nominalVoltage");
    let current = number(CURRENT_ALIASES, "current");
    let length = number(LENGTH_ALIASES, "length");
    let size_mm2 = number(SIZE_ALIASES, "sizeMm2");
    let impedance_mv_per_a_m = number(IMPEDANCE_ALIASES, "impedanceMvPerAM");

    let segment = AcCableSegment {
        nominal_voltage,
        current,
        length,
        conductor: ConductorSpec {
            size_mm2,
            cable_type: find_field(row, TYPE_ALIASES).and_then(|(_, v)| parse_text(v)),
            impedance_mv_per_a_m,
        },
        computed_voltage_drop_pct,
        circuit_class: class_field(row, &segment_id, &mut row_notes),
        segment_id,
    };
    notes.extend(row_notes);
    Some(segment)
}

/// One segment per row that carries an id, in row order.
pub fn extract_ac_segments(rows: &[Record]) -> Extraction<Vec<AcCableSegment>> {
    let mut notes = Vec::new();
    let signals = rows
        .iter()
        .enumerate()
        .filter_map(|(i, row)| extract_segment(row, i, &mut notes))
        .collect();
    Extraction { signals, notes }
}
