//! AlongTrack Pipeline - Track-relative POI resolution and job orchestration
//!
//! This crate runs the full pipeline (track loading, batched queries,
//! filtering, export and map rendering) and the background job layer around
//! it: job store, orchestrator, notifiers and the retention sweeper.

pub mod export;
pub mod filter;
pub mod jobs;
pub mod map;
pub mod notify;
pub mod pipeline;
pub mod retention;

pub use export::{build_feature_collection, GeoJsonExporter};
pub use filter::FilterEngine;
pub use jobs::{JobOrchestrator, JobRequest, JobStore};
pub use map::LeafletMapRenderer;
pub use notify::{BroadcastNotifier, FanoutNotifier, JobEvent, TracingNotifier};
pub use pipeline::{
    checkpoints, OutputNames, Pipeline, PipelineConfig, PipelineOutput, PipelineProgress,
    PipelineRequest, SilentProgress,
};
pub use retention::{RetentionSweeper, SweepReport};
