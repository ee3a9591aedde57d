//! Prompt runner for the email-triage samples.
//!
//! Fills a text template with fields from sample JSON records, logs every
//! filled prompt to one JSONL file per run, and optionally forwards each
//! prompt to the language model.

use anyhow::{Context, Result, bail};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::report::CompletionProvider;

pub const SCHEMA_VERSION: &str = "v1";

/// One sample record to triage. Unknown fields ride along untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailSample {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    #[serde(default)]
    pub subject: String,

    #[serde(default)]
    pub body: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One line of the JSONL run log.
#[derive(Debug, Serialize, Deserialize)]
pub struct TriageRecord {
    pub input: MailSample,
    pub prompt: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,

    pub meta: RunMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMeta {
    pub run_id: String,
    pub schema_version: String,
    pub timestamp: String,
}

/// What a triage run produced.
#[derive(Debug)]
pub struct TriageOutcome {
    pub log_path: PathBuf,
    pub processed: usize,
    pub skipped: usize,
}

/// Fill the `{{id}}`, `{{subject}}` and `{{body}}` placeholders.
pub fn fill_template(template: &str, sample: &MailSample) -> String {
    template
        .replace("{{id}}", &id_label(sample))
        .replace("{{subject}}", &sample.subject)
        .replace("{{body}}", &sample.body)
}

fn id_label(sample: &MailSample) -> String {
    match &sample.id {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "unknown".to_string(),
    }
}

/// Run the template over every `*.json` sample in `samples_dir`.
///
/// Unreadable samples are skipped with a warning; a missing template or an
/// empty sample directory ends the run. With `llm` set, each filled prompt
/// is forwarded and the completion lands in the record's `reply`.
pub async fn run(
    samples_dir: &Path,
    template_path: &Path,
    out_dir: &Path,
    llm: Option<(&dyn CompletionProvider, &str)>,
) -> Result<TriageOutcome> {
    let template = fs::read_to_string(template_path)
        .with_context(|| format!("Template not found at: {}", template_path.display()))?;

    let mut sample_paths: Vec<PathBuf> = fs::read_dir(samples_dir)
        .with_context(|| format!("Failed to read samples directory: {}", samples_dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    sample_paths.sort();

    if sample_paths.is_empty() {
        bail!("No sample files in {}", samples_dir.display());
    }
    tracing::info!("Found {} sample(s) in {}", sample_paths.len(), samples_dir.display());

    let started = Local::now();
    let meta = RunMeta {
        run_id: started.format("run_%Y%m%dT%H%M%S").to_string(),
        schema_version: SCHEMA_VERSION.to_string(),
        timestamp: started.format("%Y-%m-%dT%H:%M:%S").to_string(),
    };

    let mut lines = Vec::new();
    let mut skipped = 0;
    for path in &sample_paths {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("?");

        let sample: MailSample = match fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|text| serde_json::from_str(&text).map_err(anyhow::Error::from))
        {
            Ok(sample) => sample,
            Err(err) => {
                tracing::warn!("[{name}] JSON read error: {err}");
                skipped += 1;
                continue;
            }
        };

        let prompt = fill_template(&template, &sample);
        let reply = match llm {
            Some((provider, model)) => Some(provider.complete(model, &prompt).await?),
            None => None,
        };

        tracing::info!("[{}] prompt ready (len={} chars)", id_label(&sample), prompt.len());
        let record = TriageRecord { input: sample, prompt, reply, meta: meta.clone() };
        lines.push(
            serde_json::to_string(&record).context("Failed to serialize triage record")?,
        );
    }

    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;
    let log_path = out_dir.join(format!("{}.jsonl", meta.run_id));
    let mut body = lines.join("\n");
    body.push('\n');
    fs::write(&log_path, body)
        .with_context(|| format!("Failed to write run log: {}", log_path.display()))?;

    tracing::info!("All prompts written to {}", log_path.display());
    Ok(TriageOutcome { log_path, processed: lines.len(), skipped })
}
