//! Shared fixtures for pipeline integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alongtrack_core::config::MapSettings;
use alongtrack_core::error::{AlongTrackError, Result};
use alongtrack_core::models::{FilterSet, ResolvedPoi};
use alongtrack_core::ports::{QueryTransport, TableSink};
use alongtrack_overpass::{RetryPolicy, RetryingFetcher};
use alongtrack_pipeline::{
    GeoJsonExporter, LeafletMapRenderer, OutputNames, Pipeline, PipelineConfig, PipelineRequest,
};

/// Straight track along the equator, roughly 55.7 km long
pub const EQUATOR_GPX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test">
  <trk><trkseg>
    <trkpt lat="0.0" lon="0.0"></trkpt>
    <trkpt lat="0.0" lon="0.25"></trkpt>
    <trkpt lat="0.0" lon="0.5"></trkpt>
  </trkseg></trk>
</gpx>"#;

/// Every batch sees the same camp site, a private one and one far away
pub const OVERPASS_BODY: &str = r#"{"elements": [
    {"type": "node", "id": 123, "lat": 0.001, "lon": 0.1,
     "tags": {"tourism": "camp_site", "name": "Equator Camp", "website": "https://camp.example"}},
    {"type": "node", "id": 7, "lat": 0.002, "lon": 0.3,
     "tags": {"tourism": "camp_site", "access": "private"}},
    {"type": "way", "id": 5, "center": {"lat": 0.5, "lon": 0.2},
     "tags": {"tourism": "camp_site"}},
    {"type": "way", "id": 123, "center": {"lat": -0.005, "lon": 0.4},
     "tags": {"amenity": "drinking_water"}}
]}"#;

/// Transport answering every query with a fixed body
pub struct FixedTransport {
    body: String,
    calls: Mutex<usize>,
}

impl FixedTransport {
    pub fn new(body: &str) -> Self {
        Self {
            body: body.to_string(),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl QueryTransport for FixedTransport {
    async fn post(&self, _endpoint: &str, _query: &str) -> Result<String> {
        *self.calls.lock().unwrap() += 1;
        Ok(self.body.clone())
    }
}

/// Transport that always fails
pub struct DownTransport;

#[async_trait]
impl QueryTransport for DownTransport {
    async fn post(&self, endpoint: &str, _query: &str) -> Result<String> {
        Err(AlongTrackError::TransportFailure {
            attempts: 1,
            last_error: format!("{}: connection refused", endpoint),
        })
    }
}

/// Table sink that always fails
pub struct BrokenSink;

impl TableSink for BrokenSink {
    fn export(&self, _rows: &[ResolvedPoi], path: &Path) -> Result<()> {
        Err(AlongTrackError::ExportFailure {
            path: path.display().to_string(),
            reason: "disk full".to_string(),
        })
    }

    fn extension(&self) -> &str {
        "geojson"
    }
}

pub fn map_settings() -> MapSettings {
    MapSettings {
        track_color: "blue".to_string(),
        default_marker_color: "gray".to_string(),
        marker_palette: vec!["orange".to_string(), "purple".to_string()],
    }
}

pub fn pipeline_with(
    transport: Arc<dyn QueryTransport>,
    table_sink: Arc<dyn TableSink>,
    output_dir: &Path,
) -> Pipeline {
    let fetcher = RetryingFetcher::new(
        transport,
        RetryPolicy {
            endpoints: vec!["http://e1".to_string(), "http://e2".to_string()],
            attempts: 2,
            backoff: Duration::ZERO,
        },
    );
    Pipeline::new(
        fetcher,
        table_sink,
        Arc::new(LeafletMapRenderer),
        PipelineConfig {
            output_dir: output_dir.to_path_buf(),
            batch_km: 10.0,
            map: map_settings(),
        },
    )
}

pub fn pipeline(transport: Arc<dyn QueryTransport>, output_dir: &Path) -> Pipeline {
    pipeline_with(transport, Arc::new(GeoJsonExporter), output_dir)
}

pub fn write_gpx(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

pub fn request(input_path: PathBuf, filters: FilterSet) -> PipelineRequest {
    PipelineRequest {
        project_name: "Equator".to_string(),
        input_path,
        radius_km: 2.0,
        step_km: 1.2,
        filters,
        outputs: OutputNames::unique(),
    }
}

pub fn camp_filters() -> FilterSet {
    FilterSet::new(
        vec![
            "tourism=camp_site".parse().unwrap(),
            "amenity=drinking_water".parse().unwrap(),
        ],
        vec!["access=private".parse().unwrap()],
    )
}
