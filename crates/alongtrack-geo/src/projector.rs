//! Projection of candidate locations onto a track

use alongtrack_core::models::TrackPoint;

use crate::track::{NearestPoint, TrackModel};

/// Projects points onto a track and applies the search radius.
#[derive(Debug, Clone, Copy)]
pub struct TrackProjector<'a> {
    track: &'a TrackModel,
    radius_km: f64,
}

impl<'a> TrackProjector<'a> {
    pub fn new(track: &'a TrackModel, radius_km: f64) -> Self {
        Self { track, radius_km }
    }

    pub fn track(&self) -> &TrackModel {
        self.track
    }

    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }

    /// Position of `point` relative to the track, or `None` when it lies
    /// farther than the radius. A point exactly at the radius is kept.
    pub fn project(&self, point: TrackPoint) -> Option<NearestPoint> {
        let nearest = self.track.nearest(point);
        if nearest.distance_km > self.radius_km {
            None
        } else {
            Some(nearest)
        }
    }
}
