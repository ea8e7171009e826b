mod config;
mod download;
mod events;
mod health;
mod process;
mod status;

pub use config::get_config;
pub use download::{download_geojson, download_html, job_geojson};
pub use events::job_events;
pub use health::health_check;
pub use process::handle_process;
pub use status::get_status;

use alongtrack_core::models::{Job, JobId};

use crate::error::ApiError;
use crate::state::AppState;

/// Look up a job by the id in a request path
pub(crate) async fn find_job(state: &AppState, raw_id: &str) -> Result<Job, ApiError> {
    let id: JobId = raw_id
        .parse()
        .map_err(|_| ApiError::not_found("Job not found").with_details(format!("Invalid job id: {}", raw_id)))?;
    state
        .jobs()
        .get(id)
        .await
        .ok_or_else(|| ApiError::not_found("Job not found"))
}
