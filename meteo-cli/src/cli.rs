use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};

use meteo_core::{Config, OpenAiClient, OutputFormat, ReportMode, RunRequest};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "meteo", version, about = "Weather insights CLI")]
pub struct Cli {
    /// Enable detailed logs.
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch a forecast, summarize it and save the results.
    Forecast {
        /// City name, e.g. "Athens".
        #[arg(long)]
        city: String,

        /// Country code, ISO-2 (e.g. GR for Greece, US for USA).
        #[arg(long)]
        country: Option<String>,

        /// Base output path; each artifact replaces the extension.
        #[arg(long, default_value = "data/forecast")]
        out: PathBuf,

        /// Limit the forecast to the first N hours.
        #[arg(long)]
        hours: Option<usize>,

        /// Output format: json, csv or both.
        #[arg(long, default_value = "json")]
        format: String,

        /// Report mode: txt or md (local template), llm (OpenAI).
        #[arg(long)]
        report: Option<String>,

        /// OpenAI model for the LLM report.
        #[arg(long)]
        model: Option<String>,

        /// Date as YYYY-MM-DD; if absent, means "today".
        #[arg(long)]
        date: Option<String>,
    },

    /// Fill the triage prompt template for each sample and log the prompts.
    Triage {
        /// Directory with *.json sample records.
        #[arg(long)]
        samples: PathBuf,

        /// Prompt template with {{id}}, {{subject}} and {{body}} placeholders.
        #[arg(long)]
        template: PathBuf,

        /// Directory for the JSONL run log.
        #[arg(long, default_value = "outputs")]
        out_dir: PathBuf,

        /// Forward each filled prompt to OpenAI and record the reply.
        #[arg(long)]
        send: bool,

        /// OpenAI model for --send.
        #[arg(long)]
        model: Option<String>,
    },

    /// Store the OpenAI credential and default model interactively.
    Configure,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Forecast { city, country, out, hours, format, report, model, date } => {
                forecast(city, country, out, hours, format, report, model, date).await
            }
            Command::Triage { samples, template, out_dir, send, model } => {
                triage(samples, template, out_dir, send, model).await
            }
            Command::Configure => configure(),
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn forecast(
    city: String,
    country: Option<String>,
    out: PathBuf,
    hours: Option<usize>,
    format: String,
    report: Option<String>,
    model: Option<String>,
    date: Option<String>,
) -> Result<()> {
    let config = load_config_with_env()?;

    let format = OutputFormat::try_from(format.as_str())?;
    let report = report.as_deref().map(ReportMode::try_from).transpose()?;
    let country = country.map(|code| code.to_uppercase());
    let date = match date {
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{s}', expected YYYY-MM-DD"))?,
        None => Local::now().date_naive(),
    };

    let request = RunRequest { city, country, date, hours, out, format, report, model };
    let outcome = meteo_core::execute(&config, &request).await?;

    match &outcome.stats {
        Some(stats) => println!(
            "{}: {} hourly points, min {:.1} C at {}, max {:.1} C at {}, mean {:.1} C",
            outcome.place.name,
            stats.n,
            stats.t_min,
            stats.t_min_time,
            stats.t_max,
            stats.t_max_time,
            stats.mean,
        ),
        None => println!("{}: no hourly data for {}", outcome.place.name, request.date),
    }
    println!("Data saved successfully.");

    Ok(())
}

async fn triage(
    samples: PathBuf,
    template: PathBuf,
    out_dir: PathBuf,
    send: bool,
    model: Option<String>,
) -> Result<()> {
    let config = load_config_with_env()?;

    let outcome = if send {
        let api_key = config.require_openai_api_key()?;
        let client = OpenAiClient::new(&config.endpoints.openai, api_key)?;
        let model = config.model_or_default(model.as_deref());
        meteo_core::triage::run(&samples, &template, &out_dir, Some((&client, model.as_str())))
            .await?
    } else {
        meteo_core::triage::run(&samples, &template, &out_dir, None).await?
    };

    println!(
        "{} prompt(s) written to {} ({} skipped)",
        outcome.processed,
        outcome.log_path.display(),
        outcome.skipped,
    );

    Ok(())
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Password::new("OpenAI API key:")
        .with_display_mode(inquire::PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if !api_key.trim().is_empty() {
        config.set_openai_api_key(api_key.trim().to_string());
    }

    let current = config.model_or_default(None);
    let model = inquire::Text::new("Default model:")
        .with_default(&current)
        .prompt()
        .context("Failed to read model name")?;
    if !model.trim().is_empty() {
        config.default_model = Some(model.trim().to_string());
    }

    config.save()?;
    println!("Configuration saved to {}", Config::config_file_path()?.display());

    Ok(())
}

/// Env var beats the stored credential; resolved here so the library stays
/// deterministic under test.
fn load_config_with_env() -> Result<Config> {
    let mut config = Config::load()?;

    if let Ok(key) = std::env::var("OPENAI_API_KEY") {
        if !key.is_empty() {
            config.set_openai_api_key(key);
        }
    }

    Ok(config)
}
