//! Track model: cumulative geodesic distances, interpolation and nearest-point search

use geo::{Coord, Distance, Geodesic, Point};

use alongtrack_core::error::{AlongTrackError, Result};
use alongtrack_core::models::TrackPoint;

use crate::mercator;

/// A validated track with precomputed distances.
///
/// Cumulative distances are geodesic (WGS84 ellipsoid) and non-decreasing,
/// starting at 0 and ending at the total length.
#[derive(Debug, Clone)]
pub struct TrackModel {
    points: Vec<TrackPoint>,
    cumulative_km: Vec<f64>,
    projected: Vec<Coord<f64>>,
    projected_cumulative_m: Vec<f64>,
}

/// Closest position on a track to some external point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestPoint {
    /// Geodesic distance from the external point to the track, in km
    pub distance_km: f64,
    /// Along-track distance of the closest track position, in km
    pub along_track_km: f64,
}

impl TrackModel {
    pub fn new(points: Vec<TrackPoint>) -> Result<Self> {
        if points.len() < 2 {
            return Err(AlongTrackError::invalid_track(format!(
                "a track needs at least 2 points, got {}",
                points.len()
            )));
        }

        if let Some(bad) = points.iter().find(|p| !is_valid_coordinate(p)) {
            return Err(AlongTrackError::invalid_track(format!(
                "coordinate out of range: lon={}, lat={}",
                bad.lon, bad.lat
            )));
        }

        let mut cumulative_km = Vec::with_capacity(points.len());
        cumulative_km.push(0.0);
        for pair in points.windows(2) {
            let last = cumulative_km[cumulative_km.len() - 1];
            cumulative_km.push(last + geodesic_km(pair[0], pair[1]));
        }

        let projected: Vec<Coord<f64>> = points.iter().copied().map(mercator::forward).collect();
        let mut projected_cumulative_m = Vec::with_capacity(points.len());
        projected_cumulative_m.push(0.0);
        for pair in projected.windows(2) {
            let last = projected_cumulative_m[projected_cumulative_m.len() - 1];
            projected_cumulative_m.push(last + planar_length(pair[0], pair[1]));
        }

        tracing::debug!(
            points = points.len(),
            length_km = cumulative_km[cumulative_km.len() - 1],
            "Built track model"
        );

        Ok(Self {
            points,
            cumulative_km,
            projected,
            projected_cumulative_m,
        })
    }

    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    /// Cumulative geodesic distance at each track point, in km
    pub fn cumulative_km(&self) -> &[f64] {
        &self.cumulative_km
    }

    pub fn total_length_km(&self) -> f64 {
        self.cumulative_km[self.cumulative_km.len() - 1]
    }

    /// Point at `km` along the track.
    ///
    /// `km` is clamped to `[0, total]` and mapped to the same fraction of the
    /// projected (Web Mercator) length, where the position is interpolated
    /// linearly before being projected back to WGS84.
    pub fn point_at_distance(&self, km: f64) -> TrackPoint {
        let total = self.total_length_km();
        let km = if km.is_nan() { 0.0 } else { km.clamp(0.0, total) };

        let last = self.points.len() - 1;
        if km <= 0.0 {
            return self.points[0];
        }
        if km >= total {
            return self.points[last];
        }

        let projected_total = self.projected_cumulative_m[last];
        let target = km / total * projected_total;

        // First index whose cumulative projected length reaches the target
        let upper = self
            .projected_cumulative_m
            .partition_point(|&d| d < target)
            .clamp(1, last);
        let lower = upper - 1;

        let start = self.projected_cumulative_m[lower];
        let span = self.projected_cumulative_m[upper] - start;
        let t = if span > 0.0 { (target - start) / span } else { 0.0 };

        let a = self.projected[lower];
        let b = self.projected[upper];
        mercator::inverse(Coord {
            x: a.x + (b.x - a.x) * t,
            y: a.y + (b.y - a.y) * t,
        })
    }

    /// Geodesic distance from `point` to the closest track segment, and the
    /// along-track distance of that closest position.
    ///
    /// Segments are scanned in track order; only a strictly smaller distance
    /// replaces the current best, so ties resolve to the earlier position.
    pub fn nearest(&self, point: TrackPoint) -> NearestPoint {
        let mut best = NearestPoint {
            distance_km: f64::INFINITY,
            along_track_km: 0.0,
        };

        for i in 0..self.points.len() - 1 {
            let a = self.points[i];
            let b = self.points[i + 1];
            let t = segment_fraction(a, b, point);
            let foot = TrackPoint::new(a.lon + (b.lon - a.lon) * t, a.lat + (b.lat - a.lat) * t);

            let distance_km = geodesic_km(point, foot);
            if distance_km < best.distance_km {
                let segment_km = self.cumulative_km[i + 1] - self.cumulative_km[i];
                best = NearestPoint {
                    distance_km,
                    along_track_km: self.cumulative_km[i] + t * segment_km,
                };
            }
        }

        best
    }
}

/// Geodesic distance between two points on the WGS84 ellipsoid, in km
pub fn geodesic_km(a: TrackPoint, b: TrackPoint) -> f64 {
    Geodesic.distance(Point::new(a.lon, a.lat), Point::new(b.lon, b.lat)) / 1000.0
}

fn is_valid_coordinate(p: &TrackPoint) -> bool {
    p.lon.is_finite()
        && p.lat.is_finite()
        && (-180.0..=180.0).contains(&p.lon)
        && (-90.0..=90.0).contains(&p.lat)
}

fn planar_length(a: Coord<f64>, b: Coord<f64>) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

/// Fraction along segment `a -> b` of the foot of the perpendicular from
/// `p`, clamped to `[0, 1]`. Uses a local equirectangular frame centred on
/// the segment, which is accurate at segment scale.
fn segment_fraction(a: TrackPoint, b: TrackPoint, p: TrackPoint) -> f64 {
    let scale = ((a.lat + b.lat) / 2.0).to_radians().cos();
    let dx = (b.lon - a.lon) * scale;
    let dy = b.lat - a.lat;
    let len2 = dx * dx + dy * dy;
    if len2 == 0.0 {
        return 0.0;
    }
    let px = (p.lon - a.lon) * scale;
    let py = p.lat - a.lat;
    ((px * dx + py * dy) / len2).clamp(0.0, 1.0)
}
