//! Single line diagram signals, from a structured record or raw OCR text.

use std::sync::LazyLock;

use regex::Regex;

use super::{count_field, number_field, Extraction, ExtractionNote, Record};
use crate::signals::SldSignals;

const SOURCE: &str = "sld";

const VMAX_ALIASES: &[&str] = &["inverterVmaxDc", "inverter_vmax", "DC_Vmax", "Vmax_DC", "Vmax"];
const MPS_ALIASES: &[&str] = &["modulesPerString", "modules_per_string", "MPS"];

/// Inverter DC maximum as printed on diagrams: `DC MAX: 1100V`, `Vmax 1500 V`,
/// `1100V DC MAX`.
static VMAX_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)(?:DC\s*MAX(?:IMUM)?|VDC\s*MAX|MAX\s*DC|V\s*MAX)\s*[:=]?\s*(\d{3,4})\s*V",
        r"(?i)(\d{3,4})\s*V\s*(?:DC\s*MAX|VDC\s*MAX|MAX\s*DC)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

/// String length as printed on diagrams: `MODULES/STRING: 22`, `MPS = 22`.
static MPS_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)(?:MODULES\s*/\s*STRING|MODULES\s*PER\s*STRING|MOD\s*/\s*STR)\s*[:=]?\s*(\d{1,3})",
        r"(?i)\bMPS\b\s*[:=]?\s*(\d{1,3})",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

fn first_capture<'t>(patterns: &[Regex], text: &'t str) -> Option<&'t str> {
    patterns
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Signals from a structured record (e.g. a vision model's JSON answer).
pub fn extract_sld_signals(record: &Record) -> Extraction<SldSignals> {
    let mut notes = Vec::new();
    let inverter_vmax_dc =
        number_field(record, VMAX_ALIASES, SOURCE, "inverterVmaxDc", &mut notes);
    let modules_per_string =
        count_field(record, MPS_ALIASES, SOURCE, "modulesPerString", &mut notes);
    Extraction {
        signals: SldSignals {
            inverter_vmax_dc,
            modules_per_string,
        },
        notes,
    }
}

/// Signals scraped from OCR text of the diagram.
pub fn extract_sld_signals_from_text(text: &str) -> Extraction<SldSignals> {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut notes = Vec::new();

    let inverter_vmax_dc = first_capture(&VMAX_PATTERNS, &flat).and_then(|s| s.parse().ok());
    if inverter_vmax_dc.is_none() {
        notes.push(ExtractionNote::new(
            SOURCE,
            "inverterVmaxDc",
            "no DC maximum voltage label in OCR text",
        ));
    }

    let modules_per_string = first_capture(&MPS_PATTERNS, &flat).and_then(|s| s.parse().ok());
    if modules_per_string.is_none() {
        notes.push(ExtractionNote::new(
            SOURCE,
            "modulesPerString",
            "no modules-per-string label in OCR text",
        ));
    }

    Extraction {
        signals: SldSignals {
            inverter_vmax_dc,
            modules_per_string,
        },
        notes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_fields_extracted() {
        let r = json!({"inverter_vmax": "1100V", "MPS": 22});
        let out = extract_sld_signals(r.as_object().unwrap());
        assert_eq!(out.signals.inverter_vmax_dc, Some(1100.0));
        assert_eq!(out.signals.modules_per_string, Some(22));
        assert!(out.notes.is_empty());
    }

    #[test]
    fn ocr_text_labels_extracted() {
        let text = "INVERTER 1\nSUN2000-100KTL\nDC MAX: 1100 V\nMODULES / STRING: 22\n";
        let out = extract_sld_signals_from_text(text);
        assert_eq!(out.signals.inverter_vmax_dc, Some(1100.0));
        assert_eq!(out.signals.modules_per_string, Some(22));
    }

    #[test]
    fn ocr_trailing_label_form() {
        let out = extract_sld_signals_from_text("rated 1500V DC MAX, mps=26");
        assert_eq!(out.signals.inverter_vmax_dc, Some(1500.0));
        assert_eq!(out.signals.modules_per_string, Some(26));
    }

    #[test]
    fn ocr_without_labels_notes_both_fields() {
        let out = extract_sld_signals_from_text("COMBINER BOX CB-01");
        assert_eq!(out.signals, SldSignals::default());
        assert_eq!(out.notes.len(), 2);
    }
}
