use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::Stream;
use tokio::sync::broadcast::error::RecvError;

use alongtrack_core::models::Job;

use crate::error::ApiError;
use crate::state::AppState;

/// Name of the SSE event carrying a job snapshot
pub const JOB_EVENT: &str = "job_progress";

/// GET /api/status/{id}/events - live job snapshots
///
/// Sends the current snapshot first, then one snapshot per update of this
/// job. The stream ends once the job is completed or failed.
pub async fn job_events(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    // Subscribe before reading the job so no update falls in between
    let mut rx = state.events.subscribe();
    let job = super::find_job(&state, &job_id).await?;
    let id = job.id;
    let store = state.jobs().clone();

    tracing::info!(job_id = %id, "SSE client subscribed");

    let stream = async_stream::stream! {
        let mut current = job;
        if let Some(event) = snapshot_event(&current) {
            yield Ok(event);
        }

        while !current.state.is_terminal() {
            match rx.recv().await {
                Ok(event) if event.job_id() != id => continue,
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(job_id = %id, skipped, "SSE subscriber lagged");
                }
                Err(RecvError::Closed) => break,
            }

            let Some(job) = store.get(id).await else {
                break;
            };
            current = job;
            if let Some(event) = snapshot_event(&current) {
                yield Ok(event);
            }
        }

        tracing::debug!(job_id = %id, state = %current.state, "SSE stream finished");
    };

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("heartbeat"),
    ))
}

fn snapshot_event(job: &Job) -> Option<Event> {
    match serde_json::to_string(job) {
        Ok(json) => Some(Event::default().event(JOB_EVENT).data(json)),
        Err(e) => {
            tracing::warn!(job_id = %job.id, error = %e, "Failed to serialize job snapshot");
            None
        }
    }
}
