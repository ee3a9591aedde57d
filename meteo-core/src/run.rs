use anyhow::Result;
use std::path::PathBuf;

use crate::config::Config;
use crate::error::MeteoError;
use crate::forecast::ForecastClient;
use crate::geocode::{GeocodeClient, GeocodePlace};
use crate::model::{ReportMode, RunRequest, SummaryStats};
use crate::report::{self, CompletionProvider, OpenAiClient};
use crate::{persist, stats};

/// What a forecast run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub place: GeocodePlace,
    pub stats: Option<SummaryStats>,
    pub written: Vec<PathBuf>,
}

/// Run the full pipeline: resolve, fetch, summarize, synthesize, persist.
///
/// The credential check for LLM reports happens up front, before any
/// network call or file write.
pub async fn execute(config: &Config, request: &RunRequest) -> Result<RunOutcome> {
    let provider = match request.report {
        Some(ReportMode::Llm) => {
            let api_key = config.require_openai_api_key()?;
            Some(OpenAiClient::new(&config.endpoints.openai, api_key)?)
        }
        _ => None,
    };

    let provider = provider.as_ref().map(|p| p as &dyn CompletionProvider);
    execute_with_provider(config, request, provider).await
}

/// Same pipeline with an explicit completion provider, so tests can drop in
/// a stub without network access.
pub async fn execute_with_provider(
    config: &Config,
    request: &RunRequest,
    provider: Option<&dyn CompletionProvider>,
) -> Result<RunOutcome> {
    let geocoder = GeocodeClient::new(&config.endpoints.geocoding)?;
    let place = geocoder.resolve(&request.city, request.country.as_deref()).await?;
    tracing::info!(
        "Resolved {} -> lat={:.2}, lon={:.2}",
        place.name,
        place.latitude,
        place.longitude
    );

    let fetcher = ForecastClient::new(&config.endpoints.forecast)?;
    tracing::info!("Fetching forecast for {} ...", request.date);
    let mut payload = fetcher.fetch(place.latitude, place.longitude, request.date).await?;

    if let Some(hours) = request.hours {
        payload.truncate_hours(hours);
    }

    let series = payload.series();
    let summary = series.as_ref().and_then(stats::summarize);

    let report_text = match request.report {
        None => None,
        Some(ReportMode::Text) => Some(report::render_text(
            summary.as_ref(),
            &request.city,
            request.country.as_deref(),
            request.date,
        )),
        Some(ReportMode::Markdown) => Some(report::render_markdown(
            summary.as_ref(),
            &request.city,
            request.country.as_deref(),
            request.date,
        )),
        Some(ReportMode::Llm) => {
            let provider = provider.ok_or(MeteoError::MissingApiKey)?;
            let model = config.model_or_default(request.model.as_deref());
            let text = report::synthesize(
                provider,
                &model,
                summary.as_ref(),
                &request.city,
                request.country.as_deref(),
                request.date,
            )
            .await?;
            Some(text)
        }
    };

    // Fixed write order: JSON, then CSV, then the report.
    let mut written = Vec::new();
    if request.format.wants_json() {
        written.push(persist::write_json(&payload, &request.out)?);
    }
    if request.format.wants_csv() {
        written.push(persist::write_csv(&payload, &request.out)?);
    }
    if let (Some(text), Some(mode)) = (&report_text, request.report) {
        written.push(persist::write_report(text, &request.out, mode.extension())?);
    }

    Ok(RunOutcome { place, stats: summary, written })
}
