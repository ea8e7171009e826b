//! Retention sweeps over the job store and managed directories

use chrono::{Duration as ChronoDuration, Utc};
use std::fs;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

use alongtrack_core::config::CleanupSettings;
use alongtrack_core::models::Job;
use alongtrack_pipeline::{JobStore, RetentionSweeper};

const ID: &str = "6f1c1d2e-8a7b-4c3d-9e0f-112233445566";

fn settings() -> CleanupSettings {
    CleanupSettings {
        interval: Duration::from_secs(600),
        job_ttl: Duration::from_secs(6 * 3600),
        temp_file_max_age: Duration::from_secs(3600),
        output_retention: Duration::from_secs(10 * 86_400),
    }
}

#[tokio::test]
async fn test_sweep_evicts_only_expired_terminal_jobs() {
    let dir = TempDir::new().unwrap();
    let store = JobStore::new();
    let old = Utc::now() - ChronoDuration::hours(7);

    let finished = Job::with_created_at("finished", old);
    let running = Job::with_created_at("running", old);
    let (finished_id, running_id) = (finished.id, running.id);
    store.insert(finished).await;
    store.insert(running).await;
    store.fail(finished_id, "boom").await;
    store.set_progress(running_id, 40, "Querying").await;

    let sweeper = RetentionSweeper::new(store.clone(), settings(), dir.path(), dir.path());
    let report = sweeper.sweep().await;

    assert_eq!(report.evicted_jobs, 1);
    assert!(store.get(finished_id).await.is_none());
    assert!(store.get(running_id).await.is_some());
}

#[tokio::test]
async fn test_sweep_removes_stale_managed_files_only() {
    let uploads = TempDir::new().unwrap();
    let outputs = TempDir::new().unwrap();

    let temp_input = uploads.path().join(format!("{}.gpx", ID));
    let foreign_input = uploads.path().join("my-ride.gpx");
    let table = outputs.path().join(format!("{}.geojson", ID));
    let map = outputs.path().join(format!("{}.html", ID));
    let notes = outputs.path().join(format!("{}.txt", ID));
    for path in [&temp_input, &foreign_input, &table, &map, &notes] {
        fs::write(path, "x").unwrap();
    }

    let sweeper = RetentionSweeper::new(JobStore::new(), settings(), uploads.path(), outputs.path());

    // Two hours later: temp input is stale, outputs are still retained
    let report = sweeper.sweep_at(SystemTime::now() + Duration::from_secs(2 * 3600)).await;
    assert_eq!(report.removed_inputs, 1);
    assert_eq!(report.removed_outputs, 0);
    assert!(!temp_input.exists());
    assert!(foreign_input.exists());
    assert!(table.exists());

    // Eleven days later: outputs are stale too
    let report = sweeper
        .sweep_at(SystemTime::now() + Duration::from_secs(11 * 86_400))
        .await;
    assert_eq!(report.removed_outputs, 2);
    assert!(!table.exists());
    assert!(!map.exists());
    assert!(notes.exists());
    assert!(foreign_input.exists());
}

#[tokio::test]
async fn test_sweep_tolerates_missing_directories() {
    let dir = TempDir::new().unwrap();
    let sweeper = RetentionSweeper::new(
        JobStore::new(),
        settings(),
        dir.path().join("nope"),
        dir.path().join("also-nope"),
    );
    let report = sweeper.sweep().await;
    assert_eq!(report.removed_inputs + report.removed_outputs, 0);
}
