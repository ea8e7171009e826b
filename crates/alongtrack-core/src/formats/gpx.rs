use gpx::{read, Gpx};
use std::io::Cursor;

use crate::error::{AlongTrackError, Result};
use crate::models::TrackPoint;
use crate::ports::TrackDecoder;

/// GPX track decoder
///
/// Points of every track segment are concatenated in document order. Files
/// without any track points fall back to their route points.
pub struct GpxTrackDecoder;

impl TrackDecoder for GpxTrackDecoder {
    fn decode(&self, data: &[u8]) -> Result<Vec<TrackPoint>> {
        let gpx: Gpx = read(Cursor::new(data)).map_err(|e| AlongTrackError::FormatError {
            format: "GPX".to_string(),
            message: format!("Failed to parse GPX: {}", e),
        })?;

        let mut points = self.extract_track_points(&gpx);
        if points.is_empty() {
            points = self.extract_route_points(&gpx);
        }

        if points.is_empty() {
            return Err(AlongTrackError::invalid_track("no track points found in GPX"));
        }

        tracing::debug!(points = points.len(), "Decoded GPX track");
        Ok(points)
    }
}

impl GpxTrackDecoder {
    fn extract_track_points(&self, gpx: &Gpx) -> Vec<TrackPoint> {
        gpx.tracks
            .iter()
            .flat_map(|track| track.segments.iter())
            .flat_map(|segment| segment.points.iter())
            .map(|p| TrackPoint::new(p.point().x(), p.point().y()))
            .collect()
    }

    fn extract_route_points(&self, gpx: &Gpx) -> Vec<TrackPoint> {
        gpx.routes
            .iter()
            .flat_map(|route| route.points.iter())
            .map(|p| TrackPoint::new(p.point().x(), p.point().y()))
            .collect()
    }
}
