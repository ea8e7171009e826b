use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a background job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Lifecycle state of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobState::Queued => "queued",
            JobState::Processing => "processing",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Files produced by a successful run, relative to the output directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobArtifacts {
    pub geojson_file: String,
    pub html_file: String,
}

/// Summary counts of a successful run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
    pub poi_count: usize,
    pub track_length_km: f64,
}

/// Background job record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub project_name: String,
    pub state: JobState,
    pub percent: u8,
    pub message: String,
    pub created_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<JobArtifacts>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<JobSummary>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// GeoJSON document of the result, served to map clients
    #[serde(skip)]
    pub geojson: Option<serde_json::Value>,
}

impl Job {
    /// Create a queued job
    pub fn new(project_name: impl Into<String>) -> Self {
        Self::with_created_at(project_name, Utc::now())
    }

    pub fn with_created_at(project_name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: JobId::new(),
            project_name: project_name.into(),
            state: JobState::Queued,
            percent: 0,
            message: "Queued for processing".to_string(),
            created_at,
            artifacts: None,
            summary: None,
            error: None,
            geojson: None,
        }
    }

    /// Seconds elapsed between creation and `now`
    pub fn age_seconds(&self, now: DateTime<Utc>) -> i64 {
        (now - self.created_at).num_seconds()
    }
}
