use serde::Serialize;
use tabled::Tabled;

use alongtrack_core::models::ResolvedPoi;

/// Output for the run command
#[derive(Debug, Serialize)]
pub struct RunOutput {
    pub project_name: String,
    pub track_length_km: f64,
    pub poi_count: usize,
    pub geojson_file: String,
    pub html_file: String,
    pub pois: Vec<ResolvedPoi>,
}

/// One POI row in human output
#[derive(Debug, Tabled)]
pub struct PoiRow {
    #[tabled(rename = "km")]
    pub km: String,
    #[tabled(rename = "off track")]
    pub distance: String,
    pub name: String,
    pub filter: String,
}

impl From<&ResolvedPoi> for PoiRow {
    fn from(poi: &ResolvedPoi) -> Self {
        Self {
            km: format!("{:.2}", poi.km_from_start),
            distance: format!("{:.2} km", poi.distance_from_track_km),
            name: poi.name.clone(),
            filter: poi.matching_filter.clone(),
        }
    }
}

/// Output for the presets command
#[derive(Debug, Serialize)]
pub struct PresetsOutput {
    pub presets_file: String,
    pub presets: Vec<PresetInfo>,
}

#[derive(Debug, Serialize)]
pub struct PresetInfo {
    pub name: String,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

/// One preset in human output
#[derive(Debug, Tabled)]
pub struct PresetRow {
    pub name: String,
    pub include: String,
    pub exclude: String,
}

impl From<&PresetInfo> for PresetRow {
    fn from(info: &PresetInfo) -> Self {
        Self {
            name: info.name.clone(),
            include: join_rules(&info.include),
            exclude: join_rules(&info.exclude),
        }
    }
}

fn join_rules(rules: &[String]) -> String {
    if rules.is_empty() {
        "-".to_string()
    } else {
        rules.join("\n")
    }
}

/// One effective setting and where it came from
#[derive(Debug, Serialize, Tabled)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
    pub source: String,
}

/// Output for a dry run of the run command
#[derive(Debug, Serialize)]
pub struct RunPlan {
    pub track_length_km: f64,
    pub windows: usize,
    pub batches: usize,
    pub radius_km: f64,
    pub step_km: f64,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}
