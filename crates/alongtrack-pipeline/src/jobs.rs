//! Job registry and background execution of pipeline runs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use alongtrack_core::models::{Job, JobArtifacts, JobId, JobState, JobSummary};
use alongtrack_core::ports::ProgressNotifier;

use crate::pipeline::{checkpoints, Pipeline, PipelineOutput, PipelineProgress, PipelineRequest};

/// Shared, lock-guarded map of job id to job.
///
/// Every read and write goes through these methods; the lock is never held
/// across pipeline work.
#[derive(Debug, Clone, Default)]
pub struct JobStore {
    jobs: Arc<RwLock<HashMap<JobId, Job>>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, job: Job) {
        self.jobs.write().await.insert(job.id, job);
    }

    pub async fn get(&self, id: JobId) -> Option<Job> {
        self.jobs.read().await.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }

    /// Apply `f` to a job atomically and return the updated snapshot
    pub async fn update<F>(&self, id: JobId, f: F) -> Option<Job>
    where
        F: FnOnce(&mut Job),
    {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(&id)?;
        f(job);
        Some(job.clone())
    }

    /// Move a running job forward. Percent never decreases and terminal
    /// jobs are left untouched.
    pub async fn set_progress(&self, id: JobId, percent: u8, message: &str) -> Option<Job> {
        self.update(id, |job| {
            if job.state.is_terminal() {
                return;
            }
            job.state = JobState::Processing;
            job.percent = job.percent.max(percent.min(checkpoints::DONE));
            job.message = message.to_string();
        })
        .await
    }

    pub async fn complete(&self, id: JobId, output: &PipelineOutput) -> Option<Job> {
        self.update(id, |job| {
            job.state = JobState::Completed;
            job.percent = checkpoints::DONE;
            job.message = "Processing complete".to_string();
            job.artifacts = Some(JobArtifacts {
                geojson_file: output.table_file.clone(),
                html_file: output.map_file.clone(),
            });
            job.summary = Some(JobSummary {
                poi_count: output.rows.len(),
                track_length_km: output.track_length_km,
            });
            job.geojson = Some(output.geojson.clone());
            job.error = None;
        })
        .await
    }

    pub async fn fail(&self, id: JobId, error: &str) -> Option<Job> {
        self.update(id, |job| {
            job.state = JobState::Failed;
            job.percent = 0;
            job.message = "Processing failed".to_string();
            job.error = Some(error.to_string());
            job.artifacts = None;
            job.summary = None;
            job.geojson = None;
        })
        .await
    }

    /// Remove terminal jobs created more than `ttl` before `now`
    pub async fn evict_expired(&self, now: DateTime<Utc>, ttl: Duration) -> Vec<JobId> {
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let mut jobs = self.jobs.write().await;
        let expired: Vec<JobId> = jobs
            .values()
            .filter(|job| job.state.is_terminal() && job.age_seconds(now) > ttl_secs)
            .map(|job| job.id)
            .collect();
        for id in &expired {
            jobs.remove(id);
        }
        expired
    }
}

/// Runs each submitted job on its own task and records its progress.
#[derive(Clone)]
pub struct JobOrchestrator {
    store: JobStore,
    pipeline: Arc<Pipeline>,
    notifier: Arc<dyn ProgressNotifier>,
}

/// Parameters of a submitted job
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub pipeline: PipelineRequest,
    /// Remove the input file once the run has finished
    pub remove_input: bool,
}

impl JobOrchestrator {
    pub fn new(store: JobStore, pipeline: Arc<Pipeline>, notifier: Arc<dyn ProgressNotifier>) -> Self {
        Self {
            store,
            pipeline,
            notifier,
        }
    }

    pub fn store(&self) -> &JobStore {
        &self.store
    }

    /// Register a queued job and start running it in the background
    pub async fn submit(&self, request: JobRequest) -> (JobId, JoinHandle<()>) {
        let job = Job::new(request.pipeline.project_name.clone());
        let id = job.id;
        self.store.insert(job.clone()).await;
        self.publish_snapshot(&job);

        tracing::info!(job_id = %id, project = %job.project_name, "Job queued");

        let orchestrator = self.clone();
        let handle = tokio::spawn(async move {
            orchestrator.execute(id, request).await;
        });
        (id, handle)
    }

    /// Run a job to completion or failure. Errors and panics from the
    /// pipeline are recorded on the job, never propagated.
    pub async fn execute(&self, id: JobId, request: JobRequest) {
        let input_path = request.pipeline.input_path.clone();

        let run = {
            let pipeline = self.pipeline.clone();
            let reporter = JobProgress {
                id,
                store: self.store.clone(),
                notifier: self.notifier.clone(),
            };
            let pipeline_request = request.pipeline;
            tokio::spawn(async move { pipeline.run(&pipeline_request, &reporter).await })
        };

        let snapshot = match run.await {
            Ok(Ok(output)) => {
                tracing::info!(job_id = %id, pois = output.rows.len(), "Job completed");
                self.store.complete(id, &output).await
            }
            Ok(Err(e)) => {
                tracing::error!(job_id = %id, error = %e, "Job failed");
                self.store.fail(id, &e.to_string()).await
            }
            Err(e) => {
                tracing::error!(job_id = %id, error = %e, "Job task aborted");
                self.store.fail(id, &format!("pipeline task aborted: {}", e)).await
            }
        };

        if let Some(job) = snapshot {
            if let Err(e) = self.notifier.notify(id, job.percent, &job.message) {
                tracing::warn!(job_id = %id, error = %e, "Progress notification failed");
            }
            self.publish_snapshot(&job);
        }

        if request.remove_input {
            remove_input(&input_path).await;
        }
    }

    fn publish_snapshot(&self, job: &Job) {
        if let Err(e) = self.notifier.snapshot(job) {
            tracing::warn!(job_id = %job.id, error = %e, "Job snapshot notification failed");
        }
    }
}

struct JobProgress {
    id: JobId,
    store: JobStore,
    notifier: Arc<dyn ProgressNotifier>,
}

#[async_trait]
impl PipelineProgress for JobProgress {
    async fn report(&self, percent: u8, message: &str) {
        let Some(job) = self.store.set_progress(self.id, percent, message).await else {
            return;
        };
        if let Err(e) = self.notifier.notify(self.id, job.percent, &job.message) {
            tracing::warn!(job_id = %self.id, error = %e, "Progress notification failed");
        }
    }
}

async fn remove_input(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!(path = %path.display(), "Removed job input"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "Could not remove job input"),
    }
}
