use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::time::Duration;

use crate::error::{MeteoError, truncate_body};
use crate::model::SummaryStats;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Fixed text used whenever there are no stats to narrate.
pub const NO_DATA_REPORT: &str = "No hourly data to summarize.";

/// Narrow interface to the language model: one prompt in, one completion out.
///
/// No conversation state, no streaming, no retry. Tests substitute a stub.
#[async_trait]
pub trait CompletionProvider: Send + Sync + Debug {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String>;
}

/// Chat-completions client for the OpenAI API.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    http: Client,
}

impl OpenAiClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build OpenAI HTTP client")?;

        Ok(Self { base_url: base_url.into(), api_key: api_key.into(), http })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[async_trait]
impl CompletionProvider for OpenAiClient {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
        };

        let res = self
            .http
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to OpenAI (chat completions)")?;

        let status = res.status();
        let body = res.text().await.context("Failed to read OpenAI response body")?;

        if !status.is_success() {
            return Err(MeteoError::Status {
                service: "OpenAI",
                status,
                body: truncate_body(&body),
            }
            .into());
        }

        let parsed: ChatResponse =
            serde_json::from_str(&body).context("Failed to parse OpenAI chat JSON")?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("OpenAI response contained no choices"))?;

        let content = content.trim();
        if content.is_empty() {
            return Err(anyhow!("OpenAI returned an empty completion"));
        }

        Ok(content.to_string())
    }
}

/// Prompt for the LLM report; keeps the numbers and timestamps verbatim.
pub fn build_prompt(
    stats: &SummaryStats,
    city: &str,
    country: Option<&str>,
    date: NaiveDate,
) -> String {
    format!(
        "Write a concise weather report (3-5 sentences) for {place} on {date}. \
         Minimum {t_min} at {t_min_time}, Maximum {t_max} at {t_max_time}, \
         Mean {mean:.1} across {n} hourly points. Neutral tone, no hype.",
        place = place_label(city, country),
        t_min = stats.t_min,
        t_min_time = stats.t_min_time,
        t_max = stats.t_max,
        t_max_time = stats.t_max_time,
        mean = stats.mean,
        n = stats.n,
    )
}

/// Ask the model for a report.
///
/// Short-circuits to the fixed fallback when there are no stats: the model
/// is never called with empty inputs.
pub async fn synthesize(
    provider: &dyn CompletionProvider,
    model: &str,
    stats: Option<&SummaryStats>,
    city: &str,
    country: Option<&str>,
    date: NaiveDate,
) -> Result<String> {
    let Some(stats) = stats else {
        return Ok(NO_DATA_REPORT.to_string());
    };

    let prompt = build_prompt(stats, city, country, date);
    tracing::debug!("LLM prompt ({} chars)", prompt.len());

    provider.complete(model, &prompt).await
}

/// Plain-text report rendered without a network call.
pub fn render_text(
    stats: Option<&SummaryStats>,
    city: &str,
    country: Option<&str>,
    date: NaiveDate,
) -> String {
    let Some(stats) = stats else {
        return NO_DATA_REPORT.to_string();
    };

    format!(
        "Weather report for {place} on {date}\n\
         Minimum: {:.1} C at {}\n\
         Maximum: {:.1} C at {}\n\
         Mean: {:.1} C over {} hourly points\n",
        stats.t_min,
        stats.t_min_time,
        stats.t_max,
        stats.t_max_time,
        stats.mean,
        stats.n,
        place = place_label(city, country),
    )
}

/// Markdown report rendered without a network call.
pub fn render_markdown(
    stats: Option<&SummaryStats>,
    city: &str,
    country: Option<&str>,
    date: NaiveDate,
) -> String {
    let Some(stats) = stats else {
        return NO_DATA_REPORT.to_string();
    };

    format!(
        "# Weather report for {place} on {date}\n\n\
         Temperatures ranged from **{:.1} C** at {} up to **{:.1} C** at {}, \
         with a mean of {:.1} C across {} hourly points.\n",
        stats.t_min,
        stats.t_min_time,
        stats.t_max,
        stats.t_max_time,
        stats.mean,
        stats.n,
        place = place_label(city, country),
    )
}

fn place_label(city: &str, country: Option<&str>) -> String {
    match country {
        Some(code) => format!("{city}, {code}"),
        None => city.to_string(),
    }
}
