//! Design climate lookup against the Open-Meteo historical archive.
//!
//! The archive lags real time by about a week, so the lookup window ends
//! seven days before `today` and reaches back `years × 365` days. The daily
//! minimum and maximum series are reduced to the single coldest and hottest
//! values, which become the site's design Tmin and Tmax.

use std::time::Duration;

use chrono::{Days, NaiveDate};
use serde::Deserialize;

/// Days the archive trails the current date.
const ARCHIVE_LAG_DAYS: u64 = 7;

/// Errors from the weather archive layer.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The archive returned a non-2xx status code.
    #[error("Archive API error ({status}): {body}")]
    HttpStatus { status: u16, body: String },

    /// The response carried no usable temperatures.
    #[error("Archive returned no daily {0} values")]
    NoData(&'static str),
}

/// Coldest and hottest daily temperatures over the lookup window.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignClimate {
    pub tmin_c: f64,
    pub tmax_c: f64,
    /// Human-readable description of where the values came from.
    pub method: String,
}

#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    #[serde(default)]
    daily: DailySeries,
}

/// Daily series as returned by the archive. Gaps arrive as `null`.
#[derive(Debug, Default, Deserialize)]
pub struct DailySeries {
    #[serde(default)]
    pub temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    pub temperature_2m_max: Vec<Option<f64>>,
}

/// Inclusive `(start, end)` dates for a lookup ending a week before `today`.
pub fn lookup_window(today: NaiveDate, years: u32) -> (NaiveDate, NaiveDate) {
    let end = today
        .checked_sub_days(Days::new(ARCHIVE_LAG_DAYS))
        .unwrap_or(NaiveDate::MIN);
    let start = end
        .checked_sub_days(Days::new(u64::from(years) * 365))
        .unwrap_or(NaiveDate::MIN);
    (start, end)
}

/// Reduce daily series to design extremes, ignoring gaps and non-finite values.
pub fn summarize_daily(
    daily: &DailySeries,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<DesignClimate, WeatherError> {
    let tmin_c = daily
        .temperature_2m_min
        .iter()
        .flatten()
        .copied()
        .filter(|t| t.is_finite())
        .reduce(f64::min)
        .ok_or(WeatherError::NoData("temperature_2m_min"))?;
    let tmax_c = daily
        .temperature_2m_max
        .iter()
        .flatten()
        .copied()
        .filter(|t| t.is_finite())
        .reduce(f64::max)
        .ok_or(WeatherError::NoData("temperature_2m_max"))?;

    Ok(DesignClimate {
        tmin_c,
        tmax_c,
        method: format!("Open-Meteo archive daily extremes, {start} to {end}"),
    })
}

/// HTTP client for the Open-Meteo archive endpoint.
pub struct ArchiveClient {
    client: reqwest::Client,
    base_url: String,
}

impl ArchiveClient {
    /// Build a client with a request timeout.
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, WeatherError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    /// Fetch the design Tmin and Tmax for a location.
    pub async fn fetch_design_climate(
        &self,
        lat: f64,
        lon: f64,
        years: u32,
        today: NaiveDate,
    ) -> Result<DesignClimate, WeatherError> {
        let (start, end) = lookup_window(today, years);
        tracing::debug!(lat, lon, %start, %end, "Fetching archive climate");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", lat.to_string()),
                ("longitude", lon.to_string()),
                ("start_date", start.to_string()),
                ("end_date", end.to_string()),
                ("daily", "temperature_2m_min,temperature_2m_max".to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WeatherError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ArchiveResponse = response.json().await?;
        summarize_daily(&parsed.daily, start, end)
    }
}
