//! End-to-end forecast pipeline tests against mock collaborators.

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use meteo_core::{Config, Endpoints, MeteoError, OutputFormat, ReportMode, RunRequest};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn hourly_body(n: usize) -> serde_json::Value {
    let times: Vec<String> = (0..n).map(|h| format!("2026-08-07T{h:02}:00")).collect();
    let temps: Vec<f64> = (0..n).map(|h| 20.0 + h as f64 * 0.5).collect();
    serde_json::json!({
        "latitude": 37.98,
        "longitude": 23.72,
        "timezone": "Europe/Athens",
        "hourly_units": {"time": "iso8601", "temperature_2m": "\u{00b0}C"},
        "hourly": {"time": times, "temperature_2m": temps}
    })
}

async fn mount_geocoder(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "Athens"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [
                {"name": "Athens", "latitude": 37.98, "longitude": 23.72,
                 "country": "Greece", "country_code": "GR"}
            ]
        })))
        .mount(server)
        .await;
}

async fn mount_forecast(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("hourly", "temperature_2m"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn test_config(server: &MockServer, api_key: Option<&str>) -> Config {
    Config {
        default_model: None,
        openai_api_key: api_key.map(str::to_string),
        endpoints: Endpoints {
            forecast: format!("{}/v1/forecast", server.uri()),
            geocoding: format!("{}/v1/search", server.uri()),
            openai: format!("{}/v1/chat/completions", server.uri()),
        },
    }
}

fn request(out: PathBuf, format: OutputFormat, report: Option<ReportMode>) -> RunRequest {
    RunRequest {
        city: "Athens".to_string(),
        country: Some("GR".to_string()),
        date: NaiveDate::from_ymd_opt(2026, 8, 7).unwrap(),
        hours: None,
        out,
        format,
        report,
        model: None,
    }
}

#[tokio::test]
async fn both_formats_produce_json_and_csv_siblings() {
    let server = MockServer::start().await;
    mount_geocoder(&server).await;
    mount_forecast(&server, hourly_body(24)).await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&server, None);
    let req = request(dir.path().join("out"), OutputFormat::Both, None);

    let outcome = meteo_core::execute(&config, &req).await.unwrap();

    assert_eq!(outcome.place.latitude, 37.98);
    assert_eq!(outcome.place.longitude, 23.72);

    let stats = outcome.stats.expect("24 points must summarize");
    assert_eq!(stats.n, 24);
    assert_eq!(stats.t_min, 20.0);
    assert_eq!(stats.t_min_time, "2026-08-07T00:00");
    assert_eq!(stats.t_max, 31.5);
    assert_eq!(stats.t_max_time, "2026-08-07T23:00");
    assert!(stats.t_min <= stats.mean && stats.mean <= stats.t_max);

    let json_path = dir.path().join("out.json");
    let csv_path = dir.path().join("out.csv");
    assert_eq!(outcome.written, vec![json_path.clone(), csv_path.clone()]);

    // JSON carries the raw payload, hourly block included.
    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(saved["timezone"], "Europe/Athens");
    assert_eq!(saved["hourly"]["time"].as_array().unwrap().len(), 24);

    // CSV is one header plus one row per hourly point.
    let csv = fs::read_to_string(&csv_path).unwrap();
    assert_eq!(csv.lines().count(), 25);
    assert_eq!(csv.lines().next().unwrap(), "time,temperature_2m");
}

#[tokio::test]
async fn llm_report_lands_in_a_markdown_sibling() {
    let server = MockServer::start().await;
    mount_geocoder(&server).await;
    mount_forecast(&server, hourly_body(24)).await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(serde_json::json!({"model": "gpt-4.1-mini"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"message": {
                "role": "assistant",
                "content": "A mild summer day in Athens with a steady climb to 31.5 degrees."
            }}]
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&server, Some("test-key"));
    let req = request(dir.path().join("out"), OutputFormat::Both, Some(ReportMode::Llm));

    let outcome = meteo_core::execute(&config, &req).await.unwrap();

    assert_eq!(outcome.written.len(), 3);
    let report = fs::read_to_string(dir.path().join("out.md")).unwrap();
    assert!(!report.trim().is_empty());
    assert!(report.contains("Athens"));
}

#[tokio::test]
async fn missing_credential_fails_before_any_write() {
    let server = MockServer::start().await;
    mount_geocoder(&server).await;
    mount_forecast(&server, hourly_body(24)).await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&server, None);
    let req = request(dir.path().join("out"), OutputFormat::Both, Some(ReportMode::Llm));

    let err = meteo_core::execute(&config, &req).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<MeteoError>(),
        Some(MeteoError::MissingApiKey)
    ));
    assert!(!dir.path().join("out.json").exists());
    assert!(!dir.path().join("out.csv").exists());
    assert!(!dir.path().join("out.md").exists());
}

#[tokio::test]
async fn csv_request_without_hourly_values_is_fatal() {
    let server = MockServer::start().await;
    mount_geocoder(&server).await;
    mount_forecast(
        &server,
        serde_json::json!({
            "latitude": 37.98, "longitude": 23.72,
            "hourly": {"time": ["2026-08-07T00:00", "2026-08-07T01:00"]}
        }),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&server, None);
    let req = request(dir.path().join("out"), OutputFormat::Csv, None);

    let err = meteo_core::execute(&config, &req).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<MeteoError>(),
        Some(MeteoError::MissingHourlyData)
    ));
    assert!(!dir.path().join("out.csv").exists());
}

#[tokio::test]
async fn missing_hourly_block_is_tolerated_for_json_and_reports() {
    let server = MockServer::start().await;
    mount_geocoder(&server).await;
    mount_forecast(
        &server,
        serde_json::json!({"latitude": 37.98, "longitude": 23.72}),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&server, None);
    let req = request(dir.path().join("out"), OutputFormat::Json, Some(ReportMode::Text));

    let outcome = meteo_core::execute(&config, &req).await.unwrap();

    assert!(outcome.stats.is_none());
    assert!(dir.path().join("out.json").exists());
    assert_eq!(
        fs::read_to_string(dir.path().join("out.txt")).unwrap(),
        "No hourly data to summarize."
    );
}

#[tokio::test]
async fn geocoding_miss_ends_the_run_cleanly() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"results": []})),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&server, None);
    let req = request(dir.path().join("out"), OutputFormat::Json, None);

    let err = meteo_core::execute(&config, &req).await.unwrap_err();

    match err.downcast_ref::<MeteoError>() {
        Some(MeteoError::LocationNotFound { query }) => assert_eq!(query, "Athens, GR"),
        other => panic!("expected LocationNotFound, got {other:?}"),
    }
    assert!(!dir.path().join("out.json").exists());
}

#[tokio::test]
async fn hours_limit_truncates_every_artifact() {
    let server = MockServer::start().await;
    mount_geocoder(&server).await;
    mount_forecast(&server, hourly_body(24)).await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&server, None);
    let mut req = request(dir.path().join("out"), OutputFormat::Both, None);
    req.hours = Some(6);

    let outcome = meteo_core::execute(&config, &req).await.unwrap();

    assert_eq!(outcome.stats.unwrap().n, 6);

    let csv = fs::read_to_string(dir.path().join("out.csv")).unwrap();
    assert_eq!(csv.lines().count(), 7);

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("out.json")).unwrap()).unwrap();
    assert_eq!(saved["hourly"]["time"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn local_markdown_report_needs_no_credential() {
    let server = MockServer::start().await;
    mount_geocoder(&server).await;
    mount_forecast(&server, hourly_body(24)).await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&server, None);
    let req = request(dir.path().join("out"), OutputFormat::Json, Some(ReportMode::Markdown));

    let outcome = meteo_core::execute(&config, &req).await.unwrap();

    assert_eq!(outcome.written.len(), 2);
    let report = fs::read_to_string(dir.path().join("out.md")).unwrap();
    assert!(report.contains("Athens, GR"));
    assert!(report.contains("2026-08-07"));
}
