//! BoM spreadsheet rows to [`BomSignals`].

use std::collections::HashSet;

use super::{
    count_field, find_field, normalize_key, number_field, parse_count, parse_text, Extraction,
    ExtractionNote, Record,
};
use crate::signals::BomSignals;

const SOURCE: &str = "bom";

const VOC_ALIASES: &[&str] = &["moduleVoc", "Voc_STC", "Voc", "Module_Voc", "PV_Voc"];
const TEMP_COEFF_ALIASES: &[&str] = &[
    "moduleTempCoeffVoc",
    "TempCoeff",
    "Temp_Coeff",
    "Voc_TempCoeff",
    "TempCoeff_Voc",
];
const MPS_ALIASES: &[&str] = &[
    "modulesPerString",
    "Modules_per_string",
    "MPS",
    "PanelsPerString",
];
const VMAX_ALIASES: &[&str] = &[
    "inverterVmaxDc",
    "Inverter_Vmax",
    "DC_Vmax",
    "Vmax_DC",
    "Max_DC_Voltage",
];
const MPS_MAX_ALIASES: &[&str] = &[
    "inverterModulesPerStringMax",
    "Max_Modules_Per_String",
    "MPS_Max",
    "Inverter_MPS_Max",
];
const MODEL_ALIASES: &[&str] = &["inverterModel", "Inverter", "INV_Model"];
const VMP_ALIASES: &[&str] = &["moduleVmp", "Vmp_STC", "Vmp", "Module_Vmp", "PV_Vmp"];
const MPPT_MIN_ALIASES: &[&str] = &[
    "inverterMpptMinV",
    "MPPT_Min",
    "MPPT_Vmin",
    "Min_MPPT_Voltage",
];
const MPPT_MAX_ALIASES: &[&str] = &[
    "inverterMpptMaxV",
    "MPPT_Max",
    "MPPT_Vmax",
    "Max_MPPT_Voltage",
];
const CAPACITY_ALIASES: &[&str] = &[
    "systemCapacityKw",
    "System_kWp",
    "DC_Capacity_kW",
    "Capacity_kWp",
    "kWp",
];
const AC_POWER_ALIASES: &[&str] = &[
    "inverterAcPowerKw",
    "Inverter_kW",
    "AC_Power_kW",
    "Rated_AC_Power",
];
const INVERTER_COUNT_ALIASES: &[&str] = &["inverterCount", "Inverter_Qty", "Inverter_Count"];

/// Magnitudes below this are decimal fractions per °C (e.g. `-0.0029`)
/// rather than percentages (`-0.29`).
const DECIMAL_COEFF_CUTOFF: f64 = 0.05;

/// Flatten BoM rows into one record: each column takes its first non-null
/// value, since a BoM usually lists a given spec on a single line.
pub(crate) fn merge_rows(rows: &[Record]) -> Record {
    let mut seen = HashSet::new();
    let mut merged = Record::new();
    for row in rows {
        for (key, value) in row {
            if value.is_null() {
                continue;
            }
            if seen.insert(normalize_key(key)) {
                merged.insert(key.clone(), value.clone());
            }
        }
    }
    merged
}

/// Bring a Voc temperature coefficient into negative %/°C.
pub fn normalize_temp_coeff(raw: f64) -> f64 {
    let pct = if raw.abs() < DECIMAL_COEFF_CUTOFF && raw != 0.0 {
        raw * 100.0
    } else {
        raw
    };
    -pct.abs()
}

pub fn extract_bom_signals(rows: &[Record]) -> Extraction<BomSignals> {
    let record = merge_rows(rows);
    let mut notes = Vec::new();

    let module_voc = number_field(&record, VOC_ALIASES, SOURCE, "moduleVoc", &mut notes);
    let inverter_vmax_dc =
        number_field(&record, VMAX_ALIASES, SOURCE, "inverterVmaxDc", &mut notes);
    let modules_per_string =
        count_field(&record, MPS_ALIASES, SOURCE, "modulesPerString", &mut notes);
    let inverter_modules_per_string_max = count_field(
        &record,
        MPS_MAX_ALIASES,
        SOURCE,
        "inverterModulesPerStringMax",
        &mut notes,
    );

    let module_temp_coeff_voc = number_field(
        &record,
        TEMP_COEFF_ALIASES,
        SOURCE,
        "moduleTempCoeffVoc",
        &mut notes,
    )
    .map(|raw| {
        let normalized = normalize_temp_coeff(raw);
        if (normalized - raw).abs() > f64::EPSILON {
            notes.push(ExtractionNote::new(
                SOURCE,
                "moduleTempCoeffVoc",
                format!("normalised {raw} to {normalized} %/°C"),
            ));
        }
        normalized
    });

    let inverter_model = find_field(&record, MODEL_ALIASES).and_then(|(_, v)| parse_text(v));

    let module_vmp = number_field(&record, VMP_ALIASES, SOURCE, "moduleVmp", &mut notes);
    let inverter_mppt_min_v = number_field(
        &record,
        MPPT_MIN_ALIASES,
        SOURCE,
        "inverterMpptMinV",
        &mut notes,
    );
    let inverter_mppt_max_v = number_field(
        &record,
        MPPT_MAX_ALIASES,
        SOURCE,
        "inverterMpptMaxV",
        &mut notes,
    );
    let system_capacity_kw = number_field(
        &record,
        CAPACITY_ALIASES,
        SOURCE,
        "systemCapacityKw",
        &mut notes,
    );
    let inverter_ac_power_kw = number_field(
        &record,
        AC_POWER_ALIASES,
        SOURCE,
        "inverterAcPowerKw",
        &mut notes,
    );

    // An absent count means one inverter, so only an unreadable one is noted.
    let inverter_count = find_field(&record, INVERTER_COUNT_ALIASES).and_then(|(key, value)| {
        let parsed = parse_count(value);
        if parsed.is_none() {
            notes.push(ExtractionNote::new(
                SOURCE,
                "inverterCount",
                format!("column '{key}' is not a whole number: {value}"),
            ));
        }
        parsed
    });

    Extraction {
        signals: BomSignals {
            inverter_vmax_dc,
            module_voc,
            module_temp_coeff_voc,
            modules_per_string,
            inverter_modules_per_string_max,
            inverter_model,
            module_vmp,
            inverter_mppt_min_v,
            inverter_mppt_max_v,
            system_capacity_kw,
            inverter_ac_power_kw,
            inverter_count,
        },
        notes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn rows(values: Vec<Value>) -> Vec<Record> {
        values
            .into_iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    #[test]
    fn extracts_fields_spread_across_rows() {
        let bom = rows(vec![
            json!({"Item": "Module", "Voc_STC": 49.5, "Vmp_STC": "41.6 V", "TempCoeff": -0.29,
                   "MPS": null, "System_kWp": "660 kWp"}),
            json!({"Item": "Inverter", "Inverter": "SUN2000-100KTL", "Inverter_Vmax": "1100 V",
                   "MPS": 22, "Max_Modules_Per_String": 24, "MPPT_Min": "200 V",
                   "MPPT_Max": "1,000 V", "Inverter_kW": 100, "Inverter_Qty": "5 pcs"}),
        ]);
        let out = extract_bom_signals(&bom);
        assert_eq!(out.signals.module_voc, Some(49.5));
        assert_eq!(out.signals.module_temp_coeff_voc, Some(-0.29));
        assert_eq!(out.signals.inverter_vmax_dc, Some(1100.0));
        assert_eq!(out.signals.modules_per_string, Some(22));
        assert_eq!(out.signals.inverter_modules_per_string_max, Some(24));
        assert_eq!(out.signals.inverter_model.as_deref(), Some("SUN2000-100KTL"));
        assert_eq!(out.signals.module_vmp, Some(41.6));
        assert_eq!(out.signals.inverter_mppt_min_v, Some(200.0));
        assert_eq!(out.signals.inverter_mppt_max_v, Some(1000.0));
        assert_eq!(out.signals.system_capacity_kw, Some(660.0));
        assert_eq!(out.signals.inverter_ac_power_kw, Some(100.0));
        assert_eq!(out.signals.inverter_count, Some(5));
        assert!(out.notes.is_empty());
    }

    #[test]
    fn absent_inverter_count_is_not_noted() {
        let out = extract_bom_signals(&rows(vec![json!({"Inverter_kW": 100})]));
        assert_eq!(out.signals.inverter_count, None);
        assert!(!out.notes.iter().any(|n| n.field == "inverterCount"));

        let out = extract_bom_signals(&rows(vec![json!({"Inverter_Qty": "two"})]));
        assert!(out
            .notes
            .iter()
            .any(|n| n.field == "inverterCount" && n.detail.contains("whole number")));
    }

    #[test]
    fn comma_decimal_coefficient_is_rejected_not_misread() {
        let out = extract_bom_signals(&rows(vec![json!({"TempCoeff": "-0,29 %/°C"})]));
        assert_eq!(out.signals.module_temp_coeff_voc, None);
        assert!(out
            .notes
            .iter()
            .any(|n| n.field == "moduleTempCoeffVoc" && n.detail.contains("not numeric")));
    }

    #[test]
    fn exponent_notation_voc_is_read_in_full() {
        let out = extract_bom_signals(&rows(vec![json!({"Voc_STC": "4.95E+01 V"})]));
        assert_eq!(out.signals.module_voc, Some(49.5));
    }

    #[test]
    fn decimal_coefficient_scaled_to_percent() {
        let out = extract_bom_signals(&rows(vec![json!({"TempCoeff": -0.0029})]));
        let coeff = out.signals.module_temp_coeff_voc.unwrap();
        assert!((coeff + 0.29).abs() < 1e-12);
        assert!(out
            .notes
            .iter()
            .any(|n| n.field == "moduleTempCoeffVoc" && n.detail.contains("normalised")));
    }

    #[test]
    fn positive_coefficient_made_negative() {
        assert_eq!(normalize_temp_coeff(0.29), -0.29);
        assert_eq!(normalize_temp_coeff(0.0), -0.0);
    }

    #[test]
    fn missing_columns_stay_none_with_notes() {
        let out = extract_bom_signals(&rows(vec![json!({"Voc": "n/a"})]));
        assert_eq!(out.signals, BomSignals::default());
        assert!(out
            .notes
            .iter()
            .any(|n| n.field == "moduleVoc" && n.detail.contains("not numeric")));
        assert!(out
            .notes
            .iter()
            .any(|n| n.field == "inverterVmaxDc" && n.detail == "not found"));
    }
}
