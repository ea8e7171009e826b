//! Periodic eviction of stale jobs and reclamation of old files

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::task::JoinHandle;

use alongtrack_core::config::CleanupSettings;

use crate::jobs::JobStore;

/// Extension of uploaded track files awaiting processing
pub const TEMP_INPUT_EXTENSIONS: &[&str] = &["gpx"];

/// Extensions of generated artifacts
pub const OUTPUT_EXTENSIONS: &[&str] = &["geojson", "html"];

/// Counts of what one sweep removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub evicted_jobs: usize,
    pub removed_inputs: usize,
    pub removed_outputs: usize,
}

pub struct RetentionSweeper {
    store: JobStore,
    settings: CleanupSettings,
    upload_dir: PathBuf,
    output_dir: PathBuf,
}

impl RetentionSweeper {
    pub fn new(
        store: JobStore,
        settings: CleanupSettings,
        upload_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            settings,
            upload_dir: upload_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Sweep on a fixed interval until the task is aborted
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let period = self.settings.interval.max(Duration::from_secs(1));
            let mut ticker = tokio::time::interval(period);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let report = self.sweep().await;
                tracing::debug!(
                    evicted_jobs = report.evicted_jobs,
                    removed_inputs = report.removed_inputs,
                    removed_outputs = report.removed_outputs,
                    "Retention sweep finished"
                );
            }
        })
    }

    pub async fn sweep(&self) -> SweepReport {
        self.sweep_at(SystemTime::now()).await
    }

    /// Sweep as if the current time were `now`
    pub async fn sweep_at(&self, now: SystemTime) -> SweepReport {
        let evicted = self
            .store
            .evict_expired(DateTime::<Utc>::from(now), self.settings.job_ttl)
            .await;
        if !evicted.is_empty() {
            tracing::info!(count = evicted.len(), "Evicted expired jobs");
        }

        let removed_inputs = remove_stale_files(
            &self.upload_dir,
            TEMP_INPUT_EXTENSIONS,
            self.settings.temp_file_max_age,
            now,
        )
        .await;
        let removed_outputs = remove_stale_files(
            &self.output_dir,
            OUTPUT_EXTENSIONS,
            self.settings.output_retention,
            now,
        )
        .await;

        SweepReport {
            evicted_jobs: evicted.len(),
            removed_inputs,
            removed_outputs,
        }
    }
}

/// True for `<uuid>.<ext>` with a hyphenated UUID and one of `extensions`
pub fn is_managed_file(name: &str, extensions: &[&str]) -> bool {
    let Some((stem, ext)) = name.rsplit_once('.') else {
        return false;
    };
    stem.len() == 36
        && uuid::Uuid::parse_str(stem).is_ok()
        && extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
}

async fn remove_stale_files(
    dir: &Path,
    extensions: &[&str],
    max_age: Duration,
    now: SystemTime,
) -> usize {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return 0,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "Cannot list directory for cleanup");
            return 0;
        }
    };

    let mut removed = 0;
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "Directory listing failed");
                break;
            }
        };

        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !is_managed_file(name, extensions) {
            continue;
        }

        let path = entry.path();
        let modified = match entry.metadata().await.and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Cannot read file age");
                continue;
            }
        };

        let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
        if age <= max_age {
            continue;
        }

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Removed stale file");
                removed += 1;
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "Could not remove file"),
        }
    }

    removed
}
