//! Overpass JSON response parsing

use serde::Deserialize;
use std::collections::BTreeMap;

use alongtrack_core::error::{AlongTrackError, Result};
use alongtrack_core::models::{Candidate, Tags};

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    elements: Vec<Element>,
}

#[derive(Debug, Deserialize)]
struct Element {
    #[serde(rename = "type")]
    element_type: String,
    id: i64,
    lat: Option<f64>,
    lon: Option<f64>,
    center: Option<Center>,
    #[serde(default)]
    tags: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct Center {
    lat: f64,
    lon: f64,
}

impl Element {
    fn into_candidate(self) -> Option<Candidate> {
        let (lat, lon) = match (self.lat, self.lon, self.center) {
            (Some(lat), Some(lon), _) => (lat, lon),
            (_, _, Some(center)) => (center.lat, center.lon),
            _ => return None,
        };

        Some(Candidate::new(
            element_id(&self.element_type, self.id),
            lat,
            lon,
            self.tags.into_iter().collect::<Tags>(),
        ))
    }
}

/// Source identifier of an element, prefixed by its type (`N123`, `W42`)
/// because OSM ids are only unique per element type.
pub fn element_id(element_type: &str, id: i64) -> String {
    let prefix = match element_type {
        "node" => "N",
        "way" => "W",
        "relation" => "R",
        other => other,
    };
    format!("{}{}", prefix, id)
}

/// Parse an Overpass JSON body into candidates in response order.
///
/// Elements without coordinates (direct or `center`) are skipped. A body
/// that is not valid Overpass JSON is a `MalformedResponse`.
pub fn parse_response(endpoint: &str, body: &str) -> Result<Vec<Candidate>> {
    let response: OverpassResponse =
        serde_json::from_str(body).map_err(|e| AlongTrackError::MalformedResponse {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;

    let total = response.elements.len();
    let candidates: Vec<Candidate> =
        response.elements.into_iter().filter_map(Element::into_candidate).collect();

    if candidates.len() < total {
        tracing::debug!(
            skipped = total - candidates.len(),
            "Skipped elements without coordinates"
        );
    }

    Ok(candidates)
}
