use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use alongtrack_core::models::Job;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn get_status(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Json<Job>, ApiError> {
    let job = super::find_job(&state, &job_id).await?;
    Ok(Json(job))
}
