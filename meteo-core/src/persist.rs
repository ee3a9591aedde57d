use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::MeteoError;
use crate::forecast::ForecastPayload;

/// Write the full payload as pretty-printed JSON next to `base`.
///
/// Serialization happens in memory first, so the file is either complete or
/// absent. serde_json leaves non-ASCII characters unescaped.
pub fn write_json(payload: &ForecastPayload, base: &Path) -> Result<PathBuf> {
    let path = base.with_extension("json");

    let body = serde_json::to_string_pretty(payload)
        .context("Failed to serialize forecast payload to JSON")?;
    write_all(&path, body.as_bytes())?;

    tracing::info!("Saved JSON to {}", path.display());
    Ok(path)
}

/// Write the hourly series as `time,temperature_2m` rows next to `base`.
///
/// A payload without a usable hourly series is fatal here, checked before
/// the file is created: an empty or partial CSV would misrepresent the
/// forecast, while the JSON artifact stays faithful either way.
pub fn write_csv(payload: &ForecastPayload, base: &Path) -> Result<PathBuf> {
    let series = payload.series().ok_or(MeteoError::MissingHourlyData)?;
    let path = base.with_extension("csv");

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["time", "temperature_2m"])
        .context("Failed to write CSV header")?;
    for (time, temp) in series.times.iter().zip(&series.temperatures) {
        let temp = temp.to_string();
        writer
            .write_record([time.as_str(), temp.as_str()])
            .context("Failed to write CSV row")?;
    }
    let body = writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush CSV buffer: {e}"))?;
    write_all(&path, &body)?;

    tracing::info!("Saved CSV to {}", path.display());
    Ok(path)
}

/// Write report text next to `base` with the given extension.
pub fn write_report(text: &str, base: &Path, extension: &str) -> Result<PathBuf> {
    let path = base.with_extension(extension);

    write_all(&path, text.as_bytes())?;

    tracing::info!("Saved report to {}", path.display());
    Ok(path)
}

fn write_all(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }

    fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}
