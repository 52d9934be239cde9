//! Review input document and its conversion into engine signals.
//!
//! The input carries the raw collaborator output (BoM rows, SLD record or OCR
//! text, AC cable rows) plus the site location and, optionally, design
//! temperatures entered by the reviewer.

use std::path::Path;

use serde::Deserialize;

use sanad_core::extraction::sld::extract_sld_signals_from_text;
use sanad_core::extraction::{
    extract_ac_segments, extract_bom_signals, extract_sld_signals, Extraction, ExtractionNote,
    Record,
};
use sanad_core::signals::{AcCableSegment, BomSignals, SldSignals};
use sanad_core::site::{GeoPoint, SiteContext, TminSource};

use crate::error::{ReviewError, ReviewResult};
use crate::weather::DesignClimate;

/// Site location and any manually entered design temperatures.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteInput {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub tmin_c: Option<f64>,
    #[serde(default)]
    pub tmax_c: Option<f64>,
}

impl SiteInput {
    pub fn location(&self) -> GeoPoint {
        GeoPoint {
            lat: self.lat,
            lon: self.lon,
        }
    }

    /// Whether the archive must be consulted for a missing temperature.
    pub fn needs_climate_lookup(&self) -> bool {
        self.tmin_c.is_none() || self.tmax_c.is_none()
    }

    /// Build the site context, filling missing temperatures from `fetched`.
    ///
    /// A manually entered Tmin always wins over the archive value.
    pub fn resolve(&self, fetched: Option<&DesignClimate>) -> ReviewResult<SiteContext> {
        let (tmin_c, tmin_source) = match (self.tmin_c, fetched) {
            (Some(t), _) => (t, TminSource::Manual),
            (None, Some(c)) => (c.tmin_c, TminSource::Api),
            (None, None) => {
                return Err(ReviewError::MissingClimate(
                    "tmin_c not provided and weather lookup is disabled".to_string(),
                ))
            }
        };
        let tmax_c = match (self.tmax_c, fetched) {
            (Some(t), _) => t,
            (None, Some(c)) => c.tmax_c,
            (None, None) => {
                return Err(ReviewError::MissingClimate(
                    "tmax_c not provided and weather lookup is disabled".to_string(),
                ))
            }
        };
        Ok(SiteContext::new(self.location(), tmin_c, tmax_c, tmin_source)?)
    }
}

/// One project submitted for review.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewInput {
    #[serde(default)]
    pub project: Option<String>,
    pub site: SiteInput,
    /// BoM rows, one per spreadsheet line.
    #[serde(default)]
    pub bom: Vec<Record>,
    /// Structured SLD answer, preferred over `sld_text`.
    #[serde(default)]
    pub sld: Option<Record>,
    /// OCR text of the single-line diagram.
    #[serde(default)]
    pub sld_text: Option<String>,
    #[serde(default)]
    pub ac_cables: Vec<Record>,
}

/// Typed design signals pulled out of a [`ReviewInput`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedSignals {
    pub bom: BomSignals,
    pub sld: SldSignals,
    pub ac_segments: Vec<AcCableSegment>,
    pub notes: Vec<ExtractionNote>,
}

impl ReviewInput {
    pub fn extract_signals(&self) -> ExtractedSignals {
        let mut notes = Vec::new();

        let bom = extract_bom_signals(&self.bom);
        notes.extend(bom.notes);

        let sld = match (&self.sld, &self.sld_text) {
            (Some(record), _) => extract_sld_signals(record),
            (None, Some(text)) => extract_sld_signals_from_text(text),
            (None, None) => {
                notes.push(ExtractionNote::new(
                    "sld",
                    "document",
                    "no SLD record or OCR text supplied",
                ));
                Extraction {
                    signals: SldSignals::default(),
                    notes: Vec::new(),
                }
            }
        };
        notes.extend(sld.notes);

        let ac = extract_ac_segments(&self.ac_cables);
        notes.extend(ac.notes);

        ExtractedSignals {
            bom: bom.signals,
            sld: sld.signals,
            ac_segments: ac.signals,
            notes,
        }
    }
}

/// Read and parse a review input document.
pub async fn load_input(path: &Path) -> ReviewResult<ReviewInput> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ReviewError::Io {
            path: path.display().to_string(),
            source,
        })?;
    serde_json::from_str(&raw).map_err(ReviewError::InvalidInput)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn site(tmin: Option<f64>, tmax: Option<f64>) -> SiteInput {
        SiteInput {
            lat: 24.7,
            lon: 46.7,
            tmin_c: tmin,
            tmax_c: tmax,
        }
    }

    fn climate() -> DesignClimate {
        DesignClimate {
            tmin_c: -1.0,
            tmax_c: 48.0,
            method: "archive".to_string(),
        }
    }

    #[test]
    fn manual_temperatures_need_no_lookup() {
        let s = site(Some(2.0), Some(44.0));
        assert!(!s.needs_climate_lookup());
        let ctx = s.resolve(None).unwrap();
        assert_eq!(ctx.tmin_c(), 2.0);
        assert_eq!(ctx.tmin_source(), TminSource::Manual);
    }

    #[test]
    fn archive_fills_missing_values() {
        let s = site(None, None);
        assert!(s.needs_climate_lookup());
        let ctx = s.resolve(Some(&climate())).unwrap();
        assert_eq!(ctx.tmin_c(), -1.0);
        assert_eq!(ctx.tmax_c(), 48.0);
        assert_eq!(ctx.tmin_source(), TminSource::Api);
    }

    #[test]
    fn manual_tmin_wins_over_archive() {
        let ctx = site(Some(3.0), None).resolve(Some(&climate())).unwrap();
        assert_eq!(ctx.tmin_c(), 3.0);
        assert_eq!(ctx.tmax_c(), 48.0);
        assert_eq!(ctx.tmin_source(), TminSource::Manual);
    }

    #[test]
    fn missing_climate_without_lookup_is_an_error() {
        assert_matches!(
            site(None, Some(40.0)).resolve(None),
            Err(ReviewError::MissingClimate(_))
        );
    }

    #[test]
    fn invalid_site_surfaces_core_error() {
        assert_matches!(
            site(Some(30.0), Some(10.0)).resolve(None),
            Err(ReviewError::Core(_))
        );
    }

    #[test]
    fn sld_text_used_when_no_record() {
        let input: ReviewInput = serde_json::from_value(json!({
            "site": {"lat": 24.7, "lon": 46.7},
            "sld_text": "INVERTER 2\nDC MAX: 1100 V\nMODULES / STRING: 22"
        }))
        .unwrap();
        let extracted = input.extract_signals();
        assert_eq!(extracted.sld.inverter_vmax_dc, Some(1100.0));
        assert_eq!(extracted.sld.modules_per_string, Some(22));
    }

    #[test]
    fn absent_sld_is_noted() {
        let input: ReviewInput = serde_json::from_value(json!({
            "site": {"lat": 24.7, "lon": 46.7, "tmin_c": 1.0, "tmax_c": 40.0}
        }))
        .unwrap();
        let extracted = input.extract_signals();
        assert_eq!(extracted.sld, SldSignals::default());
        assert!(extracted
            .notes
            .iter()
            .any(|n| n.source == "sld" && n.field == "document"));
    }
}
