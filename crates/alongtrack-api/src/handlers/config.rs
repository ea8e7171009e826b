use std::sync::Arc;

use axum::{extract::State, Json};

use crate::dto::{ConfigDefaults, ConfigResponse};
use crate::router::MAX_UPLOAD_BYTES;
use crate::state::AppState;

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<ConfigResponse> {
    let settings = &state.settings;

    Json(ConfigResponse {
        defaults: ConfigDefaults {
            project_name: settings.project_name.clone(),
            radius_km: settings.search.radius_km,
            step_km: settings.search.step_km,
            presets: settings.search.presets.clone(),
            include: settings.search.include.clone(),
            exclude: settings.search.exclude.clone(),
        },
        presets: state.presets.names().map(str::to_string).collect(),
        presets_detail: state
            .presets
            .iter()
            .map(|(name, preset)| (name.to_string(), preset.clone()))
            .collect(),
        track_color: settings.map.track_color.clone(),
        marker_color_palette: settings.map.marker_palette.clone(),
        default_marker_color: settings.map.default_marker_color.clone(),
        max_upload_mb: MAX_UPLOAD_BYTES / (1024 * 1024),
    })
}
