//! Core library for the `meteo` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Clients for the geocoding, forecast and language-model collaborators
//! - The forecast pipeline: summary statistics, report synthesis and
//!   multi-format persistence
//! - The triage prompt runner
//!
//! It is used by `meteo-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod forecast;
pub mod geocode;
pub mod model;
pub mod persist;
pub mod report;
pub mod run;
pub mod stats;
pub mod triage;

pub use config::{Config, DEFAULT_MODEL, Endpoints};
pub use error::MeteoError;
pub use forecast::{ForecastClient, ForecastPayload, HourlyBlock};
pub use geocode::{GeocodeClient, GeocodePlace};
pub use model::{ForecastSeries, OutputFormat, ReportMode, RunRequest, SummaryStats};
pub use report::{CompletionProvider, OpenAiClient};
pub use run::{RunOutcome, execute, execute_with_provider};
