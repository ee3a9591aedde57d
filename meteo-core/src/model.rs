use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which file formats a run should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
    Both,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Both => "both",
        }
    }

    pub fn wants_json(&self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::Both)
    }

    pub fn wants_csv(&self) -> bool {
        matches!(self, OutputFormat::Csv | OutputFormat::Both)
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for OutputFormat {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "both" => Ok(OutputFormat::Both),
            _ => Err(anyhow::anyhow!(
                "Unknown format '{value}'. Supported formats: json, csv, both."
            )),
        }
    }
}

/// How the run's report should be produced, if at all.
///
/// `Text` and `Markdown` render locally; `Llm` asks the language model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportMode {
    Text,
    Markdown,
    Llm,
}

impl ReportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportMode::Text => "txt",
            ReportMode::Markdown => "md",
            ReportMode::Llm => "llm",
        }
    }

    /// File extension of the report artifact.
    pub fn extension(&self) -> &'static str {
        match self {
            ReportMode::Text => "txt",
            ReportMode::Markdown | ReportMode::Llm => "md",
        }
    }
}

impl std::fmt::Display for ReportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ReportMode {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "txt" => Ok(ReportMode::Text),
            "md" => Ok(ReportMode::Markdown),
            "llm" => Ok(ReportMode::Llm),
            _ => Err(anyhow::anyhow!(
                "Unknown report mode '{value}'. Supported modes: txt, md, llm."
            )),
        }
    }
}

/// Resolved configuration for a single invocation.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub city: String,
    /// ISO-2 country code, uppercased by the CLI.
    pub country: Option<String>,
    pub date: NaiveDate,
    /// Limit the forecast to the first N hours.
    pub hours: Option<usize>,
    /// Base output path; each artifact replaces the extension.
    pub out: PathBuf,
    pub format: OutputFormat,
    pub report: Option<ReportMode>,
    /// Model override for LLM reports; falls back to config.
    pub model: Option<String>,
}

/// Hourly timestamps and temperatures, aligned by index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub times: Vec<String>,
    pub temperatures: Vec<f64>,
}

/// Summary of one hourly temperature series. Computed once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub t_min: f64,
    pub t_min_time: String,
    pub t_max: f64,
    pub t_max_time: String,
    pub mean: f64,
    pub n: usize,
}
