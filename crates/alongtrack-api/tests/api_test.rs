//! Router-level tests driving the service through `tower::ServiceExt`

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use alongtrack_api::{create_router, AppState};
use alongtrack_core::config::LayeredConfig;
use alongtrack_core::error::Result;
use alongtrack_core::ports::QueryTransport;
use alongtrack_core::presets::PresetCatalog;

const BOUNDARY: &str = "alongtrack-test-boundary";

const EQUATOR_GPX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test">
  <trk><trkseg>
    <trkpt lat="0.0" lon="0.0"></trkpt>
    <trkpt lat="0.0" lon="0.25"></trkpt>
    <trkpt lat="0.0" lon="0.5"></trkpt>
  </trkseg></trk>
</gpx>"#;

const OVERPASS_BODY: &str = r#"{"elements": [
    {"type": "node", "id": 123, "lat": 0.001, "lon": 0.1,
     "tags": {"tourism": "camp_site", "name": "Equator Camp"}},
    {"type": "node", "id": 7, "lat": 0.002, "lon": 0.3,
     "tags": {"tourism": "camp_site", "access": "private"}},
    {"type": "way", "id": 123, "center": {"lat": -0.005, "lon": 0.4},
     "tags": {"amenity": "drinking_water"}}
]}"#;

const PRESETS: &str = r#"
[presets.camping]
include = ["tourism=camp_site"]
exclude = ["access=private"]

[presets.water]
include = ["amenity=drinking_water"]
"#;

struct FixedTransport;

#[async_trait]
impl QueryTransport for FixedTransport {
    async fn post(&self, _endpoint: &str, _query: &str) -> Result<String> {
        Ok(OVERPASS_BODY.to_string())
    }
}

struct TestApp {
    router: Router,
    _dir: TempDir,
}

fn app() -> TestApp {
    let dir = TempDir::new().unwrap();
    let toml = format!(
        r#"
[project]
name = "Equator"
output_path = '{}'
upload_dir = '{}'

[overpass]
servers = ["http://overpass.test/api/interpreter"]
retries = 1
backoff_secs = 0.0
"#,
        dir.path().join("output").display(),
        dir.path().join("uploads").display(),
    );
    let settings = LayeredConfig::with_defaults()
        .load_from_toml_str(&toml)
        .unwrap()
        .resolve()
        .unwrap();
    let presets = PresetCatalog::from_toml_str(PRESETS).unwrap();
    let state = AppState::new(settings, presets, Arc::new(FixedTransport));

    TestApp {
        router: create_router(Arc::new(state)),
        _dir: dir,
    }
}

fn multipart(file: Option<(&str, &str)>, fields: &[(&str, &str)]) -> Request<Body> {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
            BOUNDARY, name, value
        ));
    }
    if let Some((filename, content)) = file {
        body.push_str(&format!(
            "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: application/gpx+xml\r\n\r\n{}\r\n",
            BOUNDARY, filename, content
        ));
    }
    body.push_str(&format!("--{}--\r\n", BOUNDARY));

    Request::builder()
        .method("POST")
        .uri("/api/process")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>, axum::http::HeaderMap) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec(), headers)
}

async fn send_json(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body, _) = send(router, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

async fn submit_valid_job(router: &Router) -> String {
    let (status, body) = send_json(
        router,
        multipart(
            Some(("ride.gpx", EQUATOR_GPX)),
            &[("radius_km", "2"), ("preset", "camping"), ("preset", "water")],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED, "{}", body);
    assert_eq!(body["status"], "queued");
    body["job_id"].as_str().unwrap().to_string()
}

async fn wait_for_terminal(router: &Router, job_id: &str) -> Value {
    for _ in 0..200 {
        let (status, job) = send_json(router, get(&format!("/api/status/{}", job_id))).await;
        assert_eq!(status, StatusCode::OK);
        if job["state"] == "completed" || job["state"] == "failed" {
            return job;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("job {} did not finish", job_id);
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, body) = send_json(&app.router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_config_lists_presets_and_defaults() {
    let app = app();
    let (status, body) = send_json(&app.router, get("/api/config")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["defaults"]["project_name"], "Equator");
    assert_eq!(body["defaults"]["radius_km"], 5.0);
    assert_eq!(body["presets"], serde_json::json!(["camping", "water"]));
    assert_eq!(body["presets_detail"]["camping"]["exclude"][0], "access=private");
    assert_eq!(body["max_upload_mb"], 50);
}

#[tokio::test]
async fn test_process_requires_file() {
    let app = app();
    let (status, body) = send_json(&app.router, multipart(None, &[("preset", "camping")])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file provided");
}

#[tokio::test]
async fn test_process_rejects_other_formats() {
    let app = app();
    let (status, body) = send_json(
        &app.router,
        multipart(Some(("ride.kml", "<kml/>")), &[("preset", "camping")]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Only .gpx files allowed");
}

#[tokio::test]
async fn test_process_rejects_invalid_parameters() {
    let app = app();
    for fields in [
        vec![("radius_km", "-1"), ("preset", "camping")],
        vec![("radius_km", "abc"), ("preset", "camping")],
        vec![("preset", "nope")],
        vec![("include", "amenity")],
        vec![],
    ] {
        let (status, _) =
            send_json(&app.router, multipart(Some(("ride.gpx", EQUATOR_GPX)), &fields)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{:?}", fields);
    }
}

#[tokio::test]
async fn test_filters_keep_semicolons_in_values() {
    let app = app();
    let (status, body) = send_json(
        &app.router,
        multipart(
            Some(("ride.gpx", EQUATOR_GPX)),
            &[
                ("include", "cuisine=pizza;burger"),
                ("include", "shop=bakery;pastry"),
                ("exclude", "diet:vegan=only;yes"),
            ],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED, "{}", body);

    let job = wait_for_terminal(&app.router, body["job_id"].as_str().unwrap()).await;
    assert_eq!(job["state"], "completed", "{}", job);
}

#[tokio::test]
async fn test_tiny_step_fails_job_and_server_keeps_serving() {
    let app = app();
    let (status, body) = send_json(
        &app.router,
        multipart(
            Some(("ride.gpx", EQUATOR_GPX)),
            &[("step_km", "1e-12"), ("preset", "camping")],
        ),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED, "{}", body);

    let job = wait_for_terminal(&app.router, body["job_id"].as_str().unwrap()).await;
    assert_eq!(job["state"], "failed", "{}", job);
    assert_eq!(job["percent"], 0);
    assert!(job["error"].as_str().unwrap().contains("step_km"), "{}", job);

    let (status, _) = send_json(&app.router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_job_is_not_found() {
    let app = app();
    let (status, _) = send_json(
        &app.router,
        get("/api/status/6f1c1d2e-8a7b-4c3d-9e0f-112233445566"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send_json(&app.router, get("/api/status/not-a-uuid")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_job_runs_to_completion_and_serves_results() {
    let app = app();
    let job_id = submit_valid_job(&app.router).await;

    let job = wait_for_terminal(&app.router, &job_id).await;
    assert_eq!(job["state"], "completed", "{}", job);
    assert_eq!(job["percent"], 100);
    assert_eq!(job["summary"]["poi_count"], 2);

    let (status, body, headers) =
        send(&app.router, get(&format!("/api/download/geojson/{}", job_id))).await;
    assert_eq!(status, StatusCode::OK);
    let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.contains("Equator.geojson"), "{}", disposition);
    let table: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(table["features"].as_array().unwrap().len(), 2);

    let (status, body, _) = send(&app.router, get(&format!("/api/download/html/{}", job_id))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("leaflet"));

    let (status, document) =
        send_json(&app.router, get(&format!("/api/job/{}/geojson", job_id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(document["features"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_event_stream_ends_with_terminal_snapshot() {
    let app = app();
    let job_id = submit_valid_job(&app.router).await;

    let (status, body, headers) = tokio::time::timeout(
        Duration::from_secs(10),
        send(&app.router, get(&format!("/api/status/{}/events", job_id))),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));

    let text = String::from_utf8(body).unwrap();
    assert!(text.contains("event: job_progress"));
    let last = text
        .lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .last()
        .unwrap();
    let job: Value = serde_json::from_str(last).unwrap();
    assert_eq!(job["state"], "completed");
}
