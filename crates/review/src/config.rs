use std::path::PathBuf;
use std::str::FromStr;

use sanad_core::thresholds::RuleThresholds;

use crate::error::{ReviewError, ReviewResult};

/// Open-Meteo historical archive endpoint.
pub const DEFAULT_WEATHER_BASE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";
/// Years of daily history scanned for the design temperature extremes.
pub const DEFAULT_WEATHER_YEARS: u32 = 10;
/// Archive requests cover a decade of daily data, so allow a slow response.
pub const DEFAULT_WEATHER_TIMEOUT_SECS: u64 = 30;

/// Log output format, selected with `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Historical weather lookup settings.
#[derive(Debug, Clone)]
pub struct WeatherConfig {
    /// When `false`, sites must carry their own design temperatures.
    pub enabled: bool,
    pub base_url: String,
    pub years: u32,
    pub timeout_secs: u64,
}

/// Review configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ReviewConfig {
    /// Review input document. The first CLI argument takes precedence.
    pub input_path: Option<PathBuf>,
    /// Where to write the report; stdout when unset.
    pub output_path: Option<PathBuf>,
    pub weather: WeatherConfig,
    pub thresholds: RuleThresholds,
    /// Evaluate checks on separate threads.
    pub parallel_checks: bool,
    pub log_format: LogFormat,
}

impl ReviewConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                         | Default                                          |
    /// |---------------------------------|--------------------------------------------------|
    /// | `SANAD_INPUT`                   | --                                               |
    /// | `SANAD_OUTPUT`                  | stdout                                           |
    /// | `SANAD_WEATHER_ENABLED`         | `true`                                           |
    /// | `SANAD_WEATHER_BASE_URL`        | `https://archive-api.open-meteo.com/v1/archive`  |
    /// | `SANAD_WEATHER_YEARS`           | `10`                                             |
    /// | `SANAD_WEATHER_TIMEOUT_SECS`    | `30`                                             |
    /// | `SANAD_COLD_VOC_MARGIN_PCT`     | `5.0`                                            |
    /// | `SANAD_STANDARD_DROP_LIMIT_PCT` | `3.0`                                            |
    /// | `SANAD_STRICT_DROP_LIMIT_PCT`   | `1.5`                                            |
    /// | `SANAD_HIGH_AMBIENT_TEMP_C`     | `45.0`                                           |
    /// | `SANAD_DC_AC_RATIO_MIN`         | `1.0`                                            |
    /// | `SANAD_DC_AC_RATIO_WARN_MAX`    | `1.3`                                            |
    /// | `SANAD_DC_AC_RATIO_FAIL_MAX`    | `1.5`                                            |
    /// | `SANAD_PARALLEL_CHECKS`         | `false`                                          |
    /// | `LOG_FORMAT`                    | `text` (`json` for structured logs)              |
    pub fn from_env() -> ReviewResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> ReviewResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let defaults = RuleThresholds::default();
        let thresholds = RuleThresholds {
            cold_voc_warning_margin_pct: parse_or(
                get("SANAD_COLD_VOC_MARGIN_PCT"),
                "SANAD_COLD_VOC_MARGIN_PCT",
                defaults.cold_voc_warning_margin_pct,
            )?,
            standard_drop_limit_pct: parse_or(
                get("SANAD_STANDARD_DROP_LIMIT_PCT"),
                "SANAD_STANDARD_DROP_LIMIT_PCT",
                defaults.standard_drop_limit_pct,
            )?,
            strict_drop_limit_pct: parse_or(
                get("SANAD_STRICT_DROP_LIMIT_PCT"),
                "SANAD_STRICT_DROP_LIMIT_PCT",
                defaults.strict_drop_limit_pct,
            )?,
            high_ambient_temp_c: parse_or(
                get("SANAD_HIGH_AMBIENT_TEMP_C"),
                "SANAD_HIGH_AMBIENT_TEMP_C",
                defaults.high_ambient_temp_c,
            )?,
            dc_ac_ratio_min: parse_or(
                get("SANAD_DC_AC_RATIO_MIN"),
                "SANAD_DC_AC_RATIO_MIN",
                defaults.dc_ac_ratio_min,
            )?,
            dc_ac_ratio_warn_max: parse_or(
                get("SANAD_DC_AC_RATIO_WARN_MAX"),
                "SANAD_DC_AC_RATIO_WARN_MAX",
                defaults.dc_ac_ratio_warn_max,
            )?,
            dc_ac_ratio_fail_max: parse_or(
                get("SANAD_DC_AC_RATIO_FAIL_MAX"),
                "SANAD_DC_AC_RATIO_FAIL_MAX",
                defaults.dc_ac_ratio_fail_max,
            )?,
        };
        thresholds.check()?;

        let weather = WeatherConfig {
            enabled: parse_bool_or(get("SANAD_WEATHER_ENABLED"), "SANAD_WEATHER_ENABLED", true)?,
            base_url: get("SANAD_WEATHER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_WEATHER_BASE_URL.to_string()),
            years: parse_or(
                get("SANAD_WEATHER_YEARS"),
                "SANAD_WEATHER_YEARS",
                DEFAULT_WEATHER_YEARS,
            )?,
            timeout_secs: parse_or(
                get("SANAD_WEATHER_TIMEOUT_SECS"),
                "SANAD_WEATHER_TIMEOUT_SECS",
                DEFAULT_WEATHER_TIMEOUT_SECS,
            )?,
        };
        if weather.years == 0 {
            return Err(ReviewError::Config(
                "SANAD_WEATHER_YEARS must be at least 1".to_string(),
            ));
        }

        let log_format = match get("LOG_FORMAT").as_deref().map(str::to_ascii_lowercase) {
            None => LogFormat::Text,
            Some(v) if v == "text" => LogFormat::Text,
            Some(v) if v == "json" => LogFormat::Json,
            Some(other) => {
                return Err(ReviewError::Config(format!(
                    "LOG_FORMAT must be 'text' or 'json', got '{other}'"
                )))
            }
        };

        Ok(Self {
            input_path: get("SANAD_INPUT").map(PathBuf::from),
            output_path: get("SANAD_OUTPUT").map(PathBuf::from),
            weather,
            thresholds,
            parallel_checks: parse_bool_or(
                get("SANAD_PARALLEL_CHECKS"),
                "SANAD_PARALLEL_CHECKS",
                false,
            )?,
            log_format,
        })
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, key: &str, default: T) -> ReviewResult<T> {
    match raw {
        None => Ok(default),
        Some(v) => v.trim().parse().map_err(|_| {
            ReviewError::Config(format!("{key} has an invalid value: '{v}'"))
        }),
    }
}

fn parse_bool_or(raw: Option<String>, key: &str, default: bool) -> ReviewResult<bool> {
    match raw.as_deref().map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ReviewError::Config(format!(
                "{key} must be a boolean, got '{v}'"
            ))),
        },
    }
}
