//! One end-to-end review: climate, extraction, checks, output assembly.

use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use sanad_core::engine::{ComplianceEngine, ReviewSignals};
use sanad_core::finding::{ComplianceReport, Severity};
use sanad_core::site::SiteContext;
use sanad_core::snapshot::standards_snapshot;
use sanad_core::summary::ac_voltage_drop_kpis;

use crate::config::ReviewConfig;
use crate::error::ReviewResult;
use crate::input::{ExtractedSignals, ReviewInput};
use crate::output::ReviewOutput;
use crate::weather::{ArchiveClient, DesignClimate};

/// Resolve the site context, querying the archive only when a design
/// temperature is missing and lookups are enabled.
pub async fn resolve_site(
    config: &ReviewConfig,
    input: &ReviewInput,
) -> ReviewResult<(SiteContext, Option<DesignClimate>)> {
    if !input.site.needs_climate_lookup() || !config.weather.enabled {
        return Ok((input.site.resolve(None)?, None));
    }

    let client = ArchiveClient::new(
        config.weather.base_url.clone(),
        Duration::from_secs(config.weather.timeout_secs),
    )?;
    let climate = client
        .fetch_design_climate(
            input.site.lat,
            input.site.lon,
            config.weather.years,
            Utc::now().date_naive(),
        )
        .await?;
    tracing::info!(
        tmin_c = climate.tmin_c,
        tmax_c = climate.tmax_c,
        method = %climate.method,
        "Design climate resolved from archive"
    );

    let site = input.site.resolve(Some(&climate))?;
    Ok((site, Some(climate)))
}

/// Run the checks and assemble the output for an already resolved site.
pub fn review_with_site(
    config: &ReviewConfig,
    input: &ReviewInput,
    site: SiteContext,
    climate: Option<DesignClimate>,
) -> ReviewResult<ReviewOutput> {
    let engine = ComplianceEngine::new(config.thresholds.clone())?;

    let ExtractedSignals {
        bom,
        sld,
        ac_segments,
        notes,
    } = input.extract_signals();
    for note in &notes {
        tracing::debug!(
            source = note.source,
            field = %note.field,
            detail = %note.detail,
            "Extraction note"
        );
    }

    let signals = ReviewSignals {
        site,
        bom,
        sld,
        ac_segments,
    };
    let report = if config.parallel_checks {
        engine.run_parallel(&signals)
    } else {
        engine.run(&signals)
    };
    log_findings(&report);

    let verdict = report.verdict();
    tracing::info!(
        verdict = verdict.as_str(),
        findings = report.len(),
        "Review complete"
    );

    Ok(ReviewOutput {
        review_id: Uuid::now_v7(),
        generated_at: Utc::now(),
        project: input.project.clone(),
        climate_method: climate.map(|c| c.method),
        verdict,
        summary: report.summary(),
        snapshot: standards_snapshot(&report),
        ac_voltage_drop_kpis: ac_voltage_drop_kpis(&signals.ac_segments),
        findings: report,
        site: signals.site,
        extraction_notes: notes,
    })
}

/// Resolve the site, then review.
pub async fn run_review(config: &ReviewConfig, input: &ReviewInput) -> ReviewResult<ReviewOutput> {
    let (site, climate) = resolve_site(config, input).await?;
    review_with_site(config, input, site, climate)
}

fn log_findings(report: &ComplianceReport) {
    for f in report {
        let check = f.check_id().as_str();
        let subject = f.subject().unwrap_or("-");
        match f.severity() {
            Severity::Pass => tracing::info!(check, subject, "{}", f.message()),
            Severity::Warning => tracing::warn!(check, subject, "{}", f.message()),
            Severity::Fail => tracing::error!(check, subject, "{}", f.message()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn config() -> ReviewConfig {
        ReviewConfig::from_lookup(|k| match k {
            "SANAD_WEATHER_ENABLED" => Some("false".to_string()),
            _ => None,
        })
        .unwrap()
    }

    fn input() -> ReviewInput {
        serde_json::from_value(json!({
            "project": "Riyadh carport",
            "site": {"lat": 24.71, "lon": 46.68, "tmin_c": 5.0, "tmax_c": 44.0},
            "bom": [{"Voc_STC": 45.0, "Vmp_STC": 37.0, "TempCoeff": -0.29, "MPS": 10,
                     "Inverter_Vmax": 600, "Max_Modules_Per_String": 12,
                     "MPPT_Min": 200, "MPPT_Max": 550, "System_kWp": 60, "Inverter_kW": 50}],
            "sld": {"Vmax": "600 V", "MPS": 10},
            "ac_cables": [{"segmentId": "INV1", "class": "standard", "Voltage Drop(%)": 1.1}]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn manual_site_reviews_without_network() {
        let out = run_review(&config(), &input()).await.unwrap();
        assert_eq!(out.verdict, Severity::Pass);
        assert_eq!(out.findings.len(), 7);
        assert_eq!(out.summary.passed, 7);
        assert_eq!(out.project.as_deref(), Some("Riyadh carport"));
        assert!(out.climate_method.is_none());
    }

    #[test]
    fn parallel_flag_gives_same_findings() {
        let mut cfg = config();
        let site = input().site.resolve(None).unwrap();
        let sequential = review_with_site(&cfg, &input(), site.clone(), None).unwrap();
        cfg.parallel_checks = true;
        let parallel = review_with_site(&cfg, &input(), site, None).unwrap();
        assert_eq!(sequential.findings, parallel.findings);
        assert_ne!(sequential.review_id, parallel.review_id);
    }
}
