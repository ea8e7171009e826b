use std::path::Path;
use std::sync::Arc;

use alongtrack_core::config::Settings;
use alongtrack_core::ports::{ProgressNotifier, QueryTransport};
use alongtrack_core::presets::PresetCatalog;
use alongtrack_overpass::{RetryPolicy, RetryingFetcher};
use alongtrack_pipeline::{
    BroadcastNotifier, FanoutNotifier, GeoJsonExporter, JobOrchestrator, JobStore,
    LeafletMapRenderer, Pipeline, PipelineConfig, TracingNotifier,
};

/// Shared state of the HTTP service
#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub presets: PresetCatalog,
    pub orchestrator: JobOrchestrator,
    pub events: BroadcastNotifier,
}

impl AppState {
    /// Wire the pipeline and job layer around a geodata transport
    pub fn new(settings: Settings, presets: PresetCatalog, transport: Arc<dyn QueryTransport>) -> Self {
        let fetcher = RetryingFetcher::new(transport, RetryPolicy::from_settings(&settings.overpass));
        let pipeline = Pipeline::new(
            fetcher,
            Arc::new(GeoJsonExporter),
            Arc::new(LeafletMapRenderer),
            PipelineConfig {
                output_dir: settings.output_path.clone(),
                batch_km: settings.overpass.batch_km,
                map: settings.map.clone(),
            },
        );

        let events = BroadcastNotifier::default();
        let notifier: Arc<dyn ProgressNotifier> = Arc::new(FanoutNotifier::new(vec![
            Arc::new(TracingNotifier),
            Arc::new(events.clone()),
        ]));

        let orchestrator = JobOrchestrator::new(JobStore::new(), Arc::new(pipeline), notifier);

        Self {
            settings,
            presets,
            orchestrator,
            events,
        }
    }

    pub fn jobs(&self) -> &JobStore {
        self.orchestrator.store()
    }

    pub fn output_dir(&self) -> &Path {
        &self.settings.output_path
    }
}
