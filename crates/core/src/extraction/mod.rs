//! Extraction boundary: loosely typed records to typed signals.
//!
//! OCR and spreadsheet parsing hand over JSON objects whose keys and value
//! formats vary by document. These functions look fields up by alias, parse
//! numbers that may carry units, and record every field they could not use as
//! an [`ExtractionNote`] so the review shows why a check failed.

pub mod ac_cable;
pub mod bom;
pub mod sld;

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

pub use ac_cable::extract_ac_segments;
pub use bom::extract_bom_signals;
pub use sld::extract_sld_signals;

/// One row or object from a collaborator.
pub type Record = serde_json::Map<String, Value>;

/// Why a field did not make it into the typed signals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionNote {
    pub source: &'static str,
    pub field: String,
    pub detail: String,
}

impl ExtractionNote {
    pub fn new(source: &'static str, field: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            source,
            field: field.into(),
            detail: detail.into(),
        }
    }
}

/// Typed signals plus notes about anything that was dropped or normalised.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction<T> {
    pub signals: T,
    pub notes: Vec<ExtractionNote>,
}

// ---------------------------------------------------------------------------
// Key lookup
// ---------------------------------------------------------------------------

/// Lowercase alphanumerics only, so `"Voltage Drop(%)"`, `"voltage_drop"` and
/// `"VoltageDrop"` compare equal.
pub(crate) fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// First non-null value whose key matches one of `aliases`, trying aliases in
/// order. Returns the original key alongside the value.
pub(crate) fn find_field<'a>(record: &'a Record, aliases: &[&str]) -> Option<(&'a str, &'a Value)> {
    aliases.iter().find_map(|alias| {
        let wanted = normalize_key(alias);
        record
            .iter()
            .find(|(k, v)| !v.is_null() && normalize_key(k) == wanted)
            .map(|(k, v)| (k.as_str(), v))
    })
}

// ---------------------------------------------------------------------------
// Value parsing
// ---------------------------------------------------------------------------

/// Parse a JSON number, or a string whose leading token is a number
/// (`"1,100 V"`, `"−0.29 %/°C"`, `"4.95E+01"`). Non-finite results are
/// rejected, as are tokens whose separators are ambiguous (see
/// [`parse_numeric_prefix`]).
pub(crate) fn parse_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => parse_numeric_prefix(s)?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

static NUMERIC_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-]?)([\d.,]*\d)([eE][+-]?\d+)?").expect("valid regex")
});

/// Leading number of `raw`, with an optional exponent.
///
/// A comma is only accepted as a thousands separator: every group after the
/// first must have exactly three digits and no decimal point may appear. A
/// decimal comma (`"-0,29"`) or mixed separators (`"1.100,5"`) give `None`
/// rather than a silently rescaled value.
fn parse_numeric_prefix(raw: &str) -> Option<f64> {
    let s = raw.trim().replace('\u{2212}', "-");
    let caps = NUMERIC_PREFIX.captures(&s)?;
    let sign = caps.get(1).map_or("", |m| m.as_str());
    let mantissa = caps.get(2)?.as_str();
    let exponent = caps.get(3).map_or("", |m| m.as_str());

    let mantissa = if mantissa.contains(',') {
        if mantissa.contains('.') {
            return None;
        }
        let mut groups = mantissa.split(',');
        let first = groups.next()?;
        let grouped = (1..=3).contains(&first.len())
            && groups.all(|g| g.len() == 3 && g.bytes().all(|b| b.is_ascii_digit()));
        if !grouped {
            return None;
        }
        mantissa.replace(',', "")
    } else {
        mantissa.to_string()
    };

    format!("{sign}{mantissa}{exponent}").parse::<f64>().ok()
}

/// A non-negative whole number that fits a `u32`.
pub(crate) fn parse_count(value: &Value) -> Option<u32> {
    let n = parse_number(value)?;
    if n < 0.0 || n.fract() != 0.0 || n > f64::from(u32::MAX) {
        return None;
    }
    Some(n as u32)
}

pub(crate) fn parse_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Look up a numeric field, noting why it is absent.
pub(crate) fn number_field(
    record: &Record,
    aliases: &[&str],
    source: &'static str,
    field: &str,
    notes: &mut Vec<ExtractionNote>,
) -> Option<f64> {
    match find_field(record, aliases) {
        None => {
            notes.push(ExtractionNote::new(source, field, "not found"));
            None
        }
        Some((key, value)) => {
            let parsed = parse_number(value);
            if parsed.is_none() {
                notes.push(ExtractionNote::new(
                    source,
                    field,
                    format!("column '{key}' is not numeric: {value}"),
                ));
            }
            parsed
        }
    }
}

/// Look up a count field, noting why it is absent.
pub(crate) fn count_field(
    record: &Record,
    aliases: &[&str],
    source: &'static str,
    field: &str,
    notes: &mut Vec<ExtractionNote>,
) -> Option<u32> {
    match find_field(record, aliases) {
        None => {
            notes.push(ExtractionNote::new(source, field, "not found"));
            None
        }
        Some((key, value)) => {
            let parsed = parse_count(value);
            if parsed.is_none() {
                notes.push(ExtractionNote::new(
                    source,
                    field,
                    format!("column '{key}' is not a whole number: {value}"),
                ));
            }
            parsed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: Value) -> Record {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn keys_normalize_across_styles() {
        assert_eq!(normalize_key("Voltage Drop(%)"), "voltagedrop");
        assert_eq!(normalize_key("Impedance\n[90 oC]"), "impedance90oc");
        assert_eq!(normalize_key("inverter_vmax"), normalize_key("InverterVmax"));
    }

    #[test]
    fn find_field_respects_alias_order_and_skips_null() {
        let r = record(json!({"Voc": null, "Module_Voc": 49.5, "voc_stc": 50.1}));
        let (key, value) = find_field(&r, &["Voc", "Voc_STC", "Module_Voc"]).unwrap();
        assert_eq!(key, "voc_stc");
        assert_eq!(value, &json!(50.1));
    }

    #[test]
    fn numbers_parse_from_strings_with_units() {
        assert_eq!(parse_number(&json!("1,100 V")), Some(1100.0));
        assert_eq!(parse_number(&json!("\u{2212}0.29 %/°C")), Some(-0.29));
        assert_eq!(parse_number(&json!(" 49.5V ")), Some(49.5));
        assert_eq!(parse_number(&json!(600)), Some(600.0));
        assert_eq!(parse_number(&json!("1,234,567 W")), Some(1_234_567.0));
    }

    #[test]
    fn exponent_notation_parsed_whole() {
        assert_eq!(parse_number(&json!("4.95E+01")), Some(49.5));
        assert_eq!(parse_number(&json!("-2.9e-1 %/°C")), Some(-0.29));
        // A trailing letter without digits is a unit, not an exponent.
        assert_eq!(parse_number(&json!("45E")), Some(45.0));
    }

    #[test]
    fn ambiguous_separators_rejected() {
        assert_eq!(parse_number(&json!("-0,29 %/°C")), None);
        assert_eq!(parse_number(&json!("1.100,5 V")), None);
        assert_eq!(parse_number(&json!("1,10 V")), None);
        assert_eq!(parse_number(&json!("1,100.5 V")), None);
        assert_eq!(parse_number(&json!("1.2.3")), None);
    }

    #[test]
    fn rejected_separator_is_noted() {
        let r = record(json!({"TempCoeff": "-0,29 %/°C"}));
        let mut notes = Vec::new();
        assert_eq!(
            number_field(&r, &["TempCoeff"], "bom", "moduleTempCoeffVoc", &mut notes),
            None
        );
        assert_eq!(notes.len(), 1);
        assert!(notes[0].detail.contains("not numeric"));
    }

    #[test]
    fn non_numeric_values_rejected() {
        assert_eq!(parse_number(&json!("n/a")), None);
        assert_eq!(parse_number(&json!("")), None);
        assert_eq!(parse_number(&json!(true)), None);
        assert_eq!(parse_number(&json!([1])), None);
    }

    #[test]
    fn counts_must_be_whole() {
        assert_eq!(parse_count(&json!(22)), Some(22));
        assert_eq!(parse_count(&json!("22 pcs")), Some(22));
        assert_eq!(parse_count(&json!(21.5)), None);
        assert_eq!(parse_count(&json!(-3)), None);
    }

    #[test]
    fn number_field_notes_missing_and_bad_values() {
        let r = record(json!({"Voc": "unknown"}));
        let mut notes = Vec::new();
        assert_eq!(number_field(&r, &["Voc"], "bom", "moduleVoc", &mut notes), None);
        assert_eq!(number_field(&r, &["Isc"], "bom", "moduleIsc", &mut notes), None);
        assert_eq!(notes.len(), 2);
        assert!(notes[0].detail.contains("not numeric"));
        assert_eq!(notes[1].detail, "not found");
    }
}
