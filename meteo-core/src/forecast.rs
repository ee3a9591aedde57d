use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

use crate::error::{MeteoError, truncate_body};
use crate::model::ForecastSeries;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const HOURLY_FIELDS: &str = "temperature_2m";

/// Parallel hourly sequences as returned by the forecast service.
///
/// Both sequences are optional: the service may omit them for dates it has
/// no data for. Unknown keys ride along in `extra` so the payload can be
/// written back out unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HourlyBlock {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature_2m: Option<Vec<f64>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Forecast response, parsed once at the boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastPayload {
    pub latitude: f64,
    pub longitude: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hourly: Option<HourlyBlock>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ForecastPayload {
    /// The aligned (time, temperature) series.
    ///
    /// `None` when the hourly block or either sequence is missing or empty,
    /// or when the sequences disagree in length. Consumers decide whether
    /// that is tolerable (stats) or fatal (CSV).
    pub fn series(&self) -> Option<ForecastSeries> {
        let hourly = self.hourly.as_ref()?;
        let times = hourly.time.as_ref()?;
        let temps = hourly.temperature_2m.as_ref()?;

        if times.is_empty() || times.len() != temps.len() {
            return None;
        }

        Some(ForecastSeries { times: times.clone(), temperatures: temps.clone() })
    }

    /// Keep only the first `n` hourly entries.
    pub fn truncate_hours(&mut self, n: usize) {
        if let Some(hourly) = self.hourly.as_mut() {
            if let Some(times) = hourly.time.as_mut() {
                times.truncate(n);
            }
            if let Some(temps) = hourly.temperature_2m.as_mut() {
                temps.truncate(n);
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ForecastClient {
    base_url: String,
    http: Client,
}

impl ForecastClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build forecast HTTP client")?;

        Ok(Self { base_url: base_url.into(), http })
    }

    /// Fetch the hourly temperature forecast for one day at one location.
    pub async fn fetch(
        &self,
        latitude: f64,
        longitude: f64,
        date: NaiveDate,
    ) -> Result<ForecastPayload> {
        let day = date.format("%Y-%m-%d").to_string();

        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("hourly", HOURLY_FIELDS.to_string()),
                ("start_date", day.clone()),
                ("end_date", day),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await
            .context("Failed to send request to the forecast service")?;

        let status = res.status();
        let body = res.text().await.context("Failed to read forecast response body")?;

        if !status.is_success() {
            return Err(MeteoError::Status {
                service: "Forecast",
                status,
                body: truncate_body(&body),
            }
            .into());
        }

        let parsed: ForecastPayload =
            serde_json::from_str(&body).context("Failed to parse forecast JSON")?;

        Ok(parsed)
    }
}
