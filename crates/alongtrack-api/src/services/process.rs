use std::path::{Path, PathBuf};

use alongtrack_core::config::DEFAULT_STEP_RATIO;
use alongtrack_core::formats;
use alongtrack_core::models::{FilterSet, JobId};
use alongtrack_core::presets::{resolve_filters, FilterRequest};
use alongtrack_geo::QueryWindower;
use alongtrack_pipeline::{JobRequest, OutputNames, PipelineRequest};

use crate::dto::ProcessForm;
use crate::error::ApiError;
use crate::state::AppState;

/// Validated parameters of a process request
#[derive(Debug)]
pub struct ProcessParams {
    pub project_name: String,
    pub radius_km: f64,
    pub step_km: f64,
    pub filters: FilterSet,
}

/// Service turning uploads into background jobs
pub struct ProcessService;

impl ProcessService {
    /// Validate the form, store the upload and queue a job.
    ///
    /// Nothing is written to disk unless every parameter is valid.
    pub async fn submit(state: &AppState, form: ProcessForm) -> Result<JobId, ApiError> {
        let filename = match form.filename.as_deref() {
            None => {
                return Err(ApiError::bad_request("No file provided")
                    .with_details("Expected a 'file' field in the multipart form"))
            }
            Some("") => return Err(ApiError::bad_request("Empty filename")),
            Some(name) => name.to_string(),
        };
        if !formats::is_supported(&filename) {
            return Err(ApiError::bad_request("Only .gpx files allowed")
                .with_details(format!("Unsupported file: {}", filename)));
        }
        if form.data.is_empty() {
            return Err(ApiError::bad_request("Uploaded file is empty"));
        }

        let params = Self::resolve_params(state, &form)?;
        let input_path = Self::store_upload(&state.settings.upload_dir, &form.data).await?;

        tracing::info!(
            filename = %filename,
            input = %input_path.display(),
            radius_km = params.radius_km,
            step_km = params.step_km,
            include = params.filters.include.len(),
            "Accepted track upload"
        );

        let (id, _handle) = state
            .orchestrator
            .submit(JobRequest {
                pipeline: PipelineRequest {
                    project_name: params.project_name,
                    input_path,
                    radius_km: params.radius_km,
                    step_km: params.step_km,
                    filters: params.filters,
                    outputs: OutputNames::unique(),
                },
                remove_input: true,
            })
            .await;

        Ok(id)
    }

    /// Merge the form with configured defaults and validate the result
    pub fn resolve_params(state: &AppState, form: &ProcessForm) -> Result<ProcessParams, ApiError> {
        let search = &state.settings.search;

        let radius_km = form.radius_km.unwrap_or(search.radius_km);
        let step_km = match (form.step_km, form.radius_km) {
            (Some(step), _) => step,
            (None, Some(radius)) => radius * DEFAULT_STEP_RATIO,
            (None, None) => search.step_km,
        };
        QueryWindower::new(step_km, radius_km, state.settings.overpass.batch_km)?;

        let presets = if form.presets.is_empty() {
            &search.presets
        } else {
            &form.presets
        };
        let filters = resolve_filters(
            &state.presets,
            &FilterRequest {
                base_include: &search.include,
                base_exclude: &search.exclude,
                presets,
                include: &form.include,
                exclude: &form.exclude,
            },
        )?;
        if filters.include.is_empty() {
            return Err(ApiError::bad_request("No inclusion filters")
                .with_details("Select a preset or add at least one include filter"));
        }

        Ok(ProcessParams {
            project_name: form
                .project_name
                .clone()
                .unwrap_or_else(|| state.settings.project_name.clone()),
            radius_km,
            step_km,
            filters,
        })
    }

    /// Write the upload under a random name the retention sweeper recognises
    async fn store_upload(upload_dir: &Path, data: &[u8]) -> Result<PathBuf, ApiError> {
        tokio::fs::create_dir_all(upload_dir).await.map_err(|e| {
            ApiError::internal("Failed to create upload directory").with_details(e.to_string())
        })?;

        let path = upload_dir.join(format!("{}.gpx", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, data).await.map_err(|e| {
            ApiError::internal("Failed to store upload").with_details(e.to_string())
        })?;
        Ok(path)
    }
}
