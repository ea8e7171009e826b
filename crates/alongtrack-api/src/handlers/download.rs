use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use alongtrack_core::models::Job;

use crate::error::ApiError;
use crate::state::AppState;

/// Result table as an attachment named after the project
pub async fn download_geojson(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Response, ApiError> {
    let job = super::find_job(&state, &job_id).await?;
    let file = job
        .artifacts
        .as_ref()
        .map(|a| a.geojson_file.clone())
        .ok_or_else(|| ApiError::not_found("GeoJSON file not available"))?;

    let body = read_artifact(&state, &job, &file).await?;
    let disposition = format!("attachment; filename=\"{}.geojson\"", download_stem(&job.project_name));

    Ok((
        [
            (header::CONTENT_TYPE, "application/geo+json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// Map page, served inline
pub async fn download_html(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Response, ApiError> {
    let job = super::find_job(&state, &job_id).await?;
    let file = job
        .artifacts
        .as_ref()
        .map(|a| a.html_file.clone())
        .ok_or_else(|| ApiError::not_found("HTML file not available"))?;

    let body = read_artifact(&state, &job, &file).await?;
    let disposition = format!("inline; filename=\"{}.html\"", download_stem(&job.project_name));

    Ok((
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// Track and POIs of a completed job for map clients
pub async fn job_geojson(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let job = super::find_job(&state, &job_id).await?;
    job.geojson
        .map(Json)
        .ok_or_else(|| ApiError::not_found("GeoJSON not available yet"))
}

async fn read_artifact(state: &AppState, job: &Job, file: &str) -> Result<Vec<u8>, ApiError> {
    // Artifact names are generated, never taken from the request
    let path = state.output_dir().join(file);
    tracing::info!(job_id = %job.id, path = %path.display(), "Download requested");

    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ApiError::not_found("File not found")),
        Err(e) => Err(ApiError::internal("Failed to read file").with_details(e.to_string())),
    }
}

/// Project name reduced to characters safe inside a header value
fn download_stem(project_name: &str) -> String {
    let stem: String = project_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ' ') { c } else { '_' })
        .collect();
    let stem = stem.trim();
    if stem.is_empty() {
        "download".to_string()
    } else {
        stem.to_string()
    }
}
