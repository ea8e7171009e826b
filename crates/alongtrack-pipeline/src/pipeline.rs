//! End-to-end run: track file to exported table and rendered map

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use alongtrack_core::config::MapSettings;
use alongtrack_core::error::{AlongTrackError, Result};
use alongtrack_core::formats;
use alongtrack_core::models::{FilterSet, ResolvedPoi, TrackPoint};
use alongtrack_core::ports::{ColorScheme, MapRenderer, TableSink};
use alongtrack_geo::{QueryWindower, TrackModel};
use alongtrack_overpass::{build_query, ResultDeduplicator, RetryingFetcher};

use crate::export::build_feature_collection;
use crate::filter::FilterEngine;

/// Progress checkpoints reported by a run
pub mod checkpoints {
    pub const SETUP: u8 = 5;
    pub const LOADING_TRACK: u8 = 10;
    pub const TRACK_LOADED: u8 = 20;
    pub const QUERY_START: u8 = 25;
    pub const QUERY_SPAN: u8 = 45;
    pub const FETCH_COMPLETE: u8 = 75;
    pub const FILTER_COMPLETE: u8 = 82;
    pub const EXPORT_COMPLETE: u8 = 90;
    pub const RENDER_COMPLETE: u8 = 95;
    pub const DONE: u8 = 100;

    /// Percent after `done` of `total` batches have been fetched
    pub fn batch(done: usize, total: usize) -> u8 {
        if total == 0 {
            return QUERY_START + QUERY_SPAN;
        }
        let span = QUERY_SPAN as usize * done.min(total) / total;
        QUERY_START + span as u8
    }
}

/// Receives stage progress from a running pipeline
#[async_trait]
pub trait PipelineProgress: Send + Sync {
    async fn report(&self, percent: u8, message: &str);
}

/// Progress receiver that ignores every update
pub struct SilentProgress;

#[async_trait]
impl PipelineProgress for SilentProgress {
    async fn report(&self, _percent: u8, _message: &str) {}
}

/// File stems for the artifacts of one run; extensions come from the sinks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNames {
    pub table_stem: String,
    pub map_stem: String,
}

impl OutputNames {
    /// Unique random names, matched later by the retention sweeper
    pub fn unique() -> Self {
        Self {
            table_stem: uuid::Uuid::new_v4().to_string(),
            map_stem: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Both artifacts named after the project
    pub fn for_project(project_name: &str) -> Self {
        Self {
            table_stem: project_name.to_string(),
            map_stem: project_name.to_string(),
        }
    }
}

/// Parameters of one run
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub project_name: String,
    pub input_path: PathBuf,
    pub radius_km: f64,
    pub step_km: f64,
    pub filters: FilterSet,
    pub outputs: OutputNames,
}

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub rows: Vec<ResolvedPoi>,
    pub track_length_km: f64,
    pub table_file: String,
    pub map_file: String,
    pub table_path: PathBuf,
    pub map_path: PathBuf,
    pub geojson: serde_json::Value,
}

/// Settings shared by every run of a pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub output_dir: PathBuf,
    pub batch_km: f64,
    pub map: MapSettings,
}

pub struct Pipeline {
    fetcher: RetryingFetcher,
    table_sink: Arc<dyn TableSink>,
    map_renderer: Arc<dyn MapRenderer>,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(
        fetcher: RetryingFetcher,
        table_sink: Arc<dyn TableSink>,
        map_renderer: Arc<dyn MapRenderer>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            fetcher,
            table_sink,
            map_renderer,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Execute a run, reporting each stage boundary to `progress`.
    ///
    /// Parameters, filters and the track are validated before any query is
    /// sent. Batches whose queries fail on every endpoint contribute nothing;
    /// sink failures abort the run.
    pub async fn run(
        &self,
        request: &PipelineRequest,
        progress: &dyn PipelineProgress,
    ) -> Result<PipelineOutput> {
        progress.report(checkpoints::SETUP, "Preparing run").await;
        let windower =
            QueryWindower::new(request.step_km, request.radius_km, self.config.batch_km)?;
        if request.filters.include.is_empty() {
            return Err(AlongTrackError::invalid_filter(
                "",
                "at least one inclusion filter is required",
            ));
        }
        tokio::fs::create_dir_all(&self.config.output_dir).await?;

        progress.report(checkpoints::LOADING_TRACK, "Loading track").await;
        let points = load_track(&request.input_path).await?;
        let track = TrackModel::new(points)?;
        let length_km = track.total_length_km();
        progress
            .report(
                checkpoints::TRACK_LOADED,
                &format!("Track loaded: {:.1} km", length_km),
            )
            .await;

        let batches = windower.batches(&track, &request.filters.include)?;
        let total = batches.len();
        progress
            .report(
                checkpoints::QUERY_START,
                &format!("Querying Overpass in {} batches", total),
            )
            .await;

        let mut dedup = ResultDeduplicator::new();
        let mut candidates = Vec::new();
        for batch in &batches {
            let query = build_query(batch);
            let fetched = self.fetcher.fetch(&query).await;
            let fresh = dedup.admit(fetched);
            tracing::debug!(batch = batch.index, new = fresh.len(), "Fetched batch");
            candidates.extend(fresh);

            let done = batch.index + 1;
            progress
                .report(
                    checkpoints::batch(done, total),
                    &format!("Queried batch {}/{}", done, total),
                )
                .await;
        }
        progress
            .report(
                checkpoints::FETCH_COMPLETE,
                &format!("Fetched {} unique candidates", candidates.len()),
            )
            .await;

        let engine = FilterEngine::new(&track, request.radius_km, &request.filters);
        let rows = engine.resolve(&candidates);
        progress
            .report(
                checkpoints::FILTER_COMPLETE,
                &format!("{} points of interest along the track", rows.len()),
            )
            .await;

        let table_file = format!("{}.{}", request.outputs.table_stem, self.table_sink.extension());
        let table_path = self.config.output_dir.join(&table_file);
        self.table_sink.export(&rows, &table_path)?;
        progress.report(checkpoints::EXPORT_COMPLETE, "Table exported").await;

        let map_file = format!("{}.{}", request.outputs.map_stem, self.map_renderer.extension());
        let map_path = self.config.output_dir.join(&map_file);
        let colors = self.color_scheme(&request.filters);
        self.map_renderer.render(
            track.points(),
            &rows,
            &colors,
            &request.project_name,
            &map_path,
        )?;
        progress.report(checkpoints::RENDER_COMPLETE, "Map rendered").await;

        let geojson = serde_json::to_value(build_feature_collection(track.points(), &rows))?;

        tracing::info!(
            project = %request.project_name,
            length_km,
            pois = rows.len(),
            "Pipeline run complete"
        );

        Ok(PipelineOutput {
            rows,
            track_length_km: length_km,
            table_file,
            map_file,
            table_path,
            map_path,
            geojson,
        })
    }

    fn color_scheme(&self, filters: &FilterSet) -> ColorScheme {
        ColorScheme {
            track_color: self.config.map.track_color.clone(),
            default_marker_color: self.config.map.default_marker_color.clone(),
            palette: self.config.map.marker_palette.clone(),
            ranked_labels: filters.include.iter().map(|f| f.to_string()).collect(),
        }
    }
}

async fn load_track(path: &Path) -> Result<Vec<TrackPoint>> {
    let decoder = formats::decoder_for_path(path).ok_or_else(|| AlongTrackError::FormatError {
        format: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("unknown")
            .to_string(),
        message: format!(
            "unsupported track file, expected one of: {}",
            formats::SUPPORTED_EXTENSIONS.join(", ")
        ),
    })?;
    let data = tokio::fs::read(path).await?;
    decoder.decode(&data)
}

#[cfg(test)]
mod tests {
    use super::checkpoints;

    #[test]
    fn test_batch_checkpoints() {
        assert_eq!(checkpoints::batch(0, 4), 25);
        assert_eq!(checkpoints::batch(2, 4), 47);
        assert_eq!(checkpoints::batch(4, 4), 70);
        assert_eq!(checkpoints::batch(9, 4), 70);
        assert_eq!(checkpoints::batch(0, 0), 70);
    }
}
