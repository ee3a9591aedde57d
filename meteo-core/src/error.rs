use thiserror::Error;

/// Errors that callers and tests need to tell apart.
///
/// Everything else travels as an `anyhow` context chain; these variants are
/// the ones that carry policy: a geocoding miss and a missing credential are
/// input errors, a missing hourly block is fatal only when CSV was requested.
#[derive(Debug, Error)]
pub enum MeteoError {
    #[error("No geocoding results for {query}")]
    LocationNotFound { query: String },

    #[error(
        "Missing OpenAI API key.\n\
         Hint: set the OPENAI_API_KEY environment variable or run `meteo configure`."
    )]
    MissingApiKey,

    #[error("Hourly payload missing 'time' or 'temperature_2m'; cannot write CSV")]
    MissingHourlyData,

    #[error("{service} request failed with status {status}: {body}")]
    Status {
        service: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX { format!("{}...", &body[..MAX]) } else { body.to_string() }
}
