use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Largest accepted request body
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Create the API router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health
        .route("/health", get(handlers::health_check))

        // Defaults and presets
        .route("/api/config", get(handlers::get_config))

        // Jobs
        .route("/api/process", post(handlers::handle_process))
        .route("/api/status/{job_id}", get(handlers::get_status))
        .route("/api/status/{job_id}/events", get(handlers::job_events))

        // Results
        .route("/api/download/geojson/{job_id}", get(handlers::download_geojson))
        .route("/api/download/html/{job_id}", get(handlers::download_html))
        .route("/api/job/{job_id}/geojson", get(handlers::job_geojson))

        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
