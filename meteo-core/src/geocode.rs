use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::error::{MeteoError, truncate_body};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// One candidate returned by the geocoding service.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodePlace {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country: Option<String>,
    pub country_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeoSearchResponse {
    results: Option<Vec<GeocodePlace>>,
}

#[derive(Debug, Clone)]
pub struct GeocodeClient {
    base_url: String,
    http: Client,
}

impl GeocodeClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build geocoding HTTP client")?;

        Ok(Self { base_url: base_url.into(), http })
    }

    /// Resolve a free-text city (and optional ISO-2 country code) to
    /// coordinates. The service ranks candidates; the first one wins.
    pub async fn resolve(&self, city: &str, country: Option<&str>) -> Result<GeocodePlace> {
        let mut params = vec![("name", city.to_string())];
        if let Some(code) = country {
            params.push(("country", code.to_string()));
        }

        let res = self
            .http
            .get(&self.base_url)
            .query(&params)
            .send()
            .await
            .context("Failed to send request to the geocoding service")?;

        let status = res.status();
        let body = res.text().await.context("Failed to read geocoding response body")?;

        if !status.is_success() {
            return Err(MeteoError::Status {
                service: "Geocoding",
                status,
                body: truncate_body(&body),
            }
            .into());
        }

        let parsed: GeoSearchResponse =
            serde_json::from_str(&body).context("Failed to parse geocoding JSON")?;

        let place = parsed
            .results
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| MeteoError::LocationNotFound { query: place_query(city, country) })?;

        tracing::debug!(
            "Geocoded '{}' -> lat={:.2}, lon={:.2}",
            place.name,
            place.latitude,
            place.longitude
        );

        Ok(place)
    }
}

fn place_query(city: &str, country: Option<&str>) -> String {
    match country {
        Some(code) => format!("{city}, {code}"),
        None => city.to_string(),
    }
}
