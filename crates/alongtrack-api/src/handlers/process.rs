use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};

use crate::dto::{ProcessForm, ProcessResponse};
use crate::error::ApiError;
use crate::services::ProcessService;
use crate::state::AppState;

pub async fn handle_process(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ProcessResponse>), ApiError> {
    tracing::info!("Processing track upload");

    let form = ProcessForm::from_multipart(&mut multipart).await?;
    let job_id = ProcessService::submit(&state, form).await?;

    Ok((StatusCode::ACCEPTED, Json(ProcessResponse::accepted(job_id))))
}
