//! Review output document and where it is written.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use sanad_core::extraction::ExtractionNote;
use sanad_core::finding::{ComplianceReport, Severity};
use sanad_core::site::SiteContext;
use sanad_core::snapshot::StandardsSnapshot;
use sanad_core::summary::{ClassDropKpi, ReportSummary};

use crate::error::{ReviewError, ReviewResult};

/// Everything a reviewer sees for one run.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewOutput {
    pub review_id: Uuid,
    pub generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    pub site: SiteContext,
    /// How missing design temperatures were obtained, if they were looked up.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub climate_method: Option<String>,
    pub verdict: Severity,
    pub summary: ReportSummary,
    pub findings: ComplianceReport,
    pub snapshot: StandardsSnapshot,
    pub ac_voltage_drop_kpis: Vec<ClassDropKpi>,
    pub extraction_notes: Vec<ExtractionNote>,
}

/// Write the output as pretty JSON to `path`, or to stdout when `None`.
pub async fn write_output(output: &ReviewOutput, path: Option<&Path>) -> ReviewResult<()> {
    let mut json = serde_json::to_string_pretty(output).map_err(ReviewError::Serialize)?;
    json.push('\n');

    match path {
        Some(path) => tokio::fs::write(path, json)
            .await
            .map_err(|source| ReviewError::Io {
                path: path.display().to_string(),
                source,
            }),
        None => {
            let mut stdout = tokio::io::stdout();
            let io_err = |source: std::io::Error| ReviewError::Io {
                path: "<stdout>".to_string(),
                source,
            };
            stdout.write_all(json.as_bytes()).await.map_err(io_err)?;
            stdout.flush().await.map_err(io_err)
        }
    }
}
