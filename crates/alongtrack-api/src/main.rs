use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use alongtrack_core::presets::PresetCatalog;
use alongtrack_overpass::ReqwestTransport;
use alongtrack_pipeline::RetentionSweeper;

use alongtrack_api::{create_router, ApiConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "alongtrack_api=info,alongtrack_pipeline=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let api_config = ApiConfig::from_env();
    let settings = api_config.load_settings().context("Invalid configuration")?;
    let presets = PresetCatalog::load_or_empty(&settings.presets_file)
        .context("Failed to load presets")?;

    tracing::info!(
        port = api_config.port,
        output = %settings.output_path.display(),
        uploads = %settings.upload_dir.display(),
        presets = presets.len(),
        endpoints = settings.overpass.endpoints.len(),
        "Starting AlongTrack API server"
    );

    tokio::fs::create_dir_all(&settings.output_path)
        .await
        .with_context(|| format!("Failed to create {}", settings.output_path.display()))?;

    let transport = ReqwestTransport::new(settings.overpass.request_timeout)
        .context("Failed to build HTTP client")?;
    let state = Arc::new(AppState::new(settings.clone(), presets, Arc::new(transport)));

    let sweeper = RetentionSweeper::new(
        state.jobs().clone(),
        settings.cleanup,
        settings.upload_dir.clone(),
        settings.output_path.clone(),
    );
    sweeper.spawn();

    let origin: HeaderValue = api_config
        .cors_origin
        .parse()
        .with_context(|| format!("Invalid CORS origin: {}", api_config.cors_origin))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(Duration::from_secs(3600));

    let app = create_router(state).layer(cors);

    let addr = api_config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Listening on {}", addr);
    tracing::info!("CORS enabled for {}", api_config.cors_origin);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
