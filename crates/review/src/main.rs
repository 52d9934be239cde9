//! `sanad-review` -- PV design compliance review runner.
//!
//! Reads a review input document, resolves the site design temperatures
//! (from the document or the Open-Meteo archive), runs every compliance
//! check and writes the report as JSON.  Logs go to stderr so stdout stays
//! clean for the report.
//!
//! Usage: `sanad-review [INPUT_JSON]`.  The argument overrides `SANAD_INPUT`.
//!
//! # Environment variables
//!
//! | Variable                        | Required | Default  | Description                          |
//! |---------------------------------|----------|----------|--------------------------------------|
//! | `SANAD_INPUT`                   | yes*     | --       | Review input JSON (*unless passed as an argument) |
//! | `SANAD_OUTPUT`                  | no       | stdout   | Report destination file              |
//! | `SANAD_WEATHER_ENABLED`         | no       | `true`   | Allow archive lookups                |
//! | `SANAD_WEATHER_BASE_URL`        | no       | Open-Meteo archive | Archive endpoint           |
//! | `SANAD_WEATHER_YEARS`           | no       | `10`     | Years of history scanned             |
//! | `SANAD_WEATHER_TIMEOUT_SECS`    | no       | `30`     | Archive request timeout              |
//! | `SANAD_COLD_VOC_MARGIN_PCT`     | no       | `5.0`    | Cold-weather Voc warning margin      |
//! | `SANAD_STANDARD_DROP_LIMIT_PCT` | no       | `3.0`    | AC drop limit, standard circuits     |
//! | `SANAD_STRICT_DROP_LIMIT_PCT`   | no       | `1.5`    | AC drop limit, strict circuits       |
//! | `SANAD_HIGH_AMBIENT_TEMP_C`     | no       | `45.0`   | Tmax above which derating is flagged |
//! | `SANAD_DC_AC_RATIO_MIN`         | no       | `1.0`    | DC/AC ratio below which a warning is raised |
//! | `SANAD_DC_AC_RATIO_WARN_MAX`    | no       | `1.3`    | DC/AC ratio above which a warning is raised |
//! | `SANAD_DC_AC_RATIO_FAIL_MAX`    | no       | `1.5`    | DC/AC ratio above which the check fails |
//! | `SANAD_PARALLEL_CHECKS`         | no       | `false`  | Run checks on separate threads       |
//! | `LOG_FORMAT`                    | no       | `text`   | `json` for structured logs           |
//! | `RUST_LOG`                      | no       | `sanad_review=info,sanad_core=info` | Log filter |

use std::path::PathBuf;

use sanad_review::config::{LogFormat, ReviewConfig};
use sanad_review::error::{ReviewError, ReviewResult};
use sanad_review::input::load_input;
use sanad_review::output::write_output;
use sanad_review::review::run_review;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Tracing is configured from the loaded config, so a config error is
    // logged through a plain text subscriber.
    let config = ReviewConfig::from_env();
    init_tracing(
        config
            .as_ref()
            .map_or(LogFormat::Text, |config| config.log_format),
    );

    let result = match config {
        Ok(config) => run(config).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        tracing::error!(error = %e, "Review failed");
        std::process::exit(1);
    }
}

fn init_tracing(format: LogFormat) {
    let json = format == LogFormat::Json;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sanad_review=info,sanad_core=info".into()),
        )
        .with(json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}

async fn run(mut config: ReviewConfig) -> ReviewResult<()> {
    if let Some(arg) = std::env::args().nth(1) {
        config.input_path = Some(PathBuf::from(arg));
    }
    let input_path = config.input_path.clone().ok_or_else(|| {
        ReviewError::Config("no input: pass a path or set SANAD_INPUT".to_string())
    })?;

    tracing::info!(
        input = %input_path.display(),
        weather_enabled = config.weather.enabled,
        parallel = config.parallel_checks,
        "Starting sanad-review",
    );

    let input = load_input(&input_path).await?;
    let output = run_review(&config, &input).await?;
    write_output(&output, config.output_path.as_deref()).await?;

    if let Some(path) = &config.output_path {
        tracing::info!(
            review_id = %output.review_id,
            output = %path.display(),
            "Report written"
        );
    }
    Ok(())
}
