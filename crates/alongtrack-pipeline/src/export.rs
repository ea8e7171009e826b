//! GeoJSON export of the result table

use geojson::{feature::Id, Feature, FeatureCollection, Geometry, Value};
use serde_json::{Map, Value as JsonValue};
use std::fs;
use std::path::Path;

use alongtrack_core::error::{AlongTrackError, Result};
use alongtrack_core::models::{ResolvedPoi, TrackPoint};
use alongtrack_core::ports::TableSink;

/// Writes the result rows as a GeoJSON FeatureCollection of points
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoJsonExporter;

impl TableSink for GeoJsonExporter {
    fn export(&self, rows: &[ResolvedPoi], path: &Path) -> Result<()> {
        let collection = FeatureCollection {
            features: rows.iter().map(poi_feature).collect(),
            bbox: None,
            foreign_members: None,
        };

        let export_error = |reason: String| AlongTrackError::ExportFailure {
            path: path.display().to_string(),
            reason,
        };

        let json =
            serde_json::to_string_pretty(&collection).map_err(|e| export_error(e.to_string()))?;
        fs::write(path, json).map_err(|e| export_error(e.to_string()))?;

        tracing::debug!(path = %path.display(), rows = rows.len(), "Exported GeoJSON table");
        Ok(())
    }

    fn extension(&self) -> &str {
        "geojson"
    }
}

/// Track line plus one point per POI, as kept on the job record
pub fn build_feature_collection(track: &[TrackPoint], rows: &[ResolvedPoi]) -> FeatureCollection {
    let mut features = Vec::with_capacity(rows.len() + 1);

    if !track.is_empty() {
        let mut properties = Map::new();
        properties.insert("featureType".to_string(), JsonValue::from("track"));
        features.push(Feature {
            geometry: Some(Geometry::new(Value::LineString(
                track.iter().map(|p| vec![p.lon, p.lat]).collect(),
            ))),
            properties: Some(properties),
            id: None,
            bbox: None,
            foreign_members: None,
        });
    }

    features.extend(rows.iter().map(poi_feature));

    FeatureCollection {
        features,
        bbox: None,
        foreign_members: None,
    }
}

fn poi_feature(row: &ResolvedPoi) -> Feature {
    let mut properties = Map::new();
    properties.insert("featureType".to_string(), JsonValue::from("poi"));
    properties.insert("name".to_string(), JsonValue::from(row.name.clone()));
    properties.insert("matching_filter".to_string(), JsonValue::from(row.matching_filter.clone()));
    properties.insert("kilometers_from_start".to_string(), JsonValue::from(row.km_from_start));
    properties.insert("distance_km".to_string(), JsonValue::from(row.distance_from_track_km));
    properties.insert("website".to_string(), JsonValue::from(row.website.clone()));
    properties.insert("phone".to_string(), JsonValue::from(row.phone.clone()));
    properties.insert("opening_hours".to_string(), JsonValue::from(row.opening_hours.clone()));
    properties.insert("tags".to_string(), JsonValue::from(row.tags.to_string()));

    Feature {
        geometry: Some(Geometry::new(Value::Point(vec![row.lon, row.lat]))),
        properties: Some(properties),
        id: Some(Id::String(row.id.clone())),
        bbox: None,
        foreign_members: None,
    }
}
