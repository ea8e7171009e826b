use serde::Serialize;
use std::collections::BTreeMap;

use alongtrack_core::models::{JobId, JobState};
use alongtrack_core::presets::Preset;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok",
            service: "alongtrack-api",
        }
    }
}

/// Accepted job response (202)
#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub job_id: JobId,
    pub status: JobState,
    pub message: String,
}

impl ProcessResponse {
    pub fn accepted(job_id: JobId) -> Self {
        Self {
            job_id,
            status: JobState::Queued,
            message: format!("Processing started. Poll /api/status/{} for progress.", job_id),
        }
    }
}

/// Defaults and presets offered to clients building a request
#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub defaults: ConfigDefaults,
    pub presets: Vec<String>,
    pub presets_detail: BTreeMap<String, Preset>,
    pub track_color: String,
    pub marker_color_palette: Vec<String>,
    pub default_marker_color: String,
    pub max_upload_mb: usize,
}

#[derive(Debug, Serialize)]
pub struct ConfigDefaults {
    pub project_name: String,
    pub radius_km: f64,
    pub step_km: f64,
    pub presets: Vec<String>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}
