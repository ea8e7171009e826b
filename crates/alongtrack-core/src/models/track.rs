use serde::{Deserialize, Serialize};

/// A single track position in WGS84 degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub lon: f64,
    pub lat: f64,
}

impl TrackPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl From<(f64, f64)> for TrackPoint {
    fn from((lon, lat): (f64, f64)) -> Self {
        Self { lon, lat }
    }
}

impl From<TrackPoint> for (f64, f64) {
    fn from(point: TrackPoint) -> Self {
        (point.lon, point.lat)
    }
}
