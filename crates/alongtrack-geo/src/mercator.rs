//! Spherical Web Mercator (EPSG:3857)

use geo::Coord;

use alongtrack_core::models::TrackPoint;

/// Semi-major axis of WGS84, used as the sphere radius by EPSG:3857
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Latitude limit of the projection
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Project a WGS84 point to Web Mercator meters
pub fn forward(point: TrackPoint) -> Coord<f64> {
    let lat = point.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    Coord {
        x: EARTH_RADIUS_M * point.lon.to_radians(),
        y: EARTH_RADIUS_M * (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln(),
    }
}

/// Back-project Web Mercator meters to WGS84 degrees
pub fn inverse(coord: Coord<f64>) -> TrackPoint {
    let lon = (coord.x / EARTH_RADIUS_M).to_degrees();
    let lat = (2.0 * (coord.y / EARTH_RADIUS_M).exp().atan() - std::f64::consts::FRAC_PI_2)
        .to_degrees();
    TrackPoint::new(lon, lat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin() {
        let c = forward(TrackPoint::new(0.0, 0.0));
        assert!(c.x.abs() < 1e-9);
        assert!(c.y.abs() < 1e-9);
    }

    #[test]
    fn test_known_value() {
        // Antimeridian maps to half the equatorial circumference
        let c = forward(TrackPoint::new(180.0, 0.0));
        assert!((c.x - 20_037_508.342_789_244).abs() < 1e-3);
    }

    #[test]
    fn test_inverse_restores_point() {
        let p = TrackPoint::new(11.394, 47.262);
        let back = inverse(forward(p));
        assert!((back.lon - p.lon).abs() < 1e-9);
        assert!((back.lat - p.lat).abs() < 1e-9);
    }
}
