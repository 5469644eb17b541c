//! Great-circle distance on a spherical Earth.
//!
//! Uses the spherical law of cosines with the equatorial radius
//! (6378.137 km), not the mean radius.

use crate::location::Coordinate;
use std::f64::consts::PI;

const DEG: f64 = PI / 180.0;

/// Equatorial Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6378.137;

/// Distance in kilometers between two coordinates.
///
/// The `acos` argument is clamped to [-1, 1]: rounding can push it just past
/// 1.0 for identical points, which would otherwise yield NaN.
pub fn great_circle_distance_km(origin: Coordinate, destination: Coordinate) -> f64 {
    let lat1 = origin.lat * DEG;
    let lon1 = origin.lon * DEG;
    let lat2 = destination.lat * DEG;
    let lon2 = destination.lon * DEG;

    let cos_angle = lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * (lon2 - lon1).cos();
    EARTH_RADIUS_KM * cos_angle.clamp(-1.0, 1.0).acos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const TOKYO: Coordinate = Coordinate { lat: 35.69, lon: 139.70 };
    const OSAKA: Coordinate = Coordinate { lat: 34.69, lon: 135.50 };

    fn sample_points() -> Vec<Coordinate> {
        let mut pts = vec![
            TOKYO,
            OSAKA,
            Coordinate::ZERO,
            Coordinate::new(90.0, 0.0),
            Coordinate::new(-90.0, 180.0),
            Coordinate::new(0.0, 180.0),
            Coordinate::new(0.0, -180.0),
            Coordinate::new(-35.69, -40.30),
        ];
        let mut lat = -89.5;
        while lat < 90.0 {
            pts.push(Coordinate::new(lat, lat * 1.7 - 13.0));
            lat += 7.25;
        }
        pts
    }

    #[test]
    fn test_tokyo_osaka() {
        let d = great_circle_distance_km(TOKYO, OSAKA);
        assert!(d > 390.0 && d < 410.0, "got {}", d);
    }

    #[test]
    fn test_identical_points_are_zero() {
        for p in sample_points() {
            let d = great_circle_distance_km(p, p);
            assert!(!d.is_nan());
            assert!(d.abs() < 1e-3, "{:?} -> {}", p, d);
        }
    }

    #[test]
    fn test_never_nan() {
        let pts = sample_points();
        for a in &pts {
            for b in &pts {
                let d = great_circle_distance_km(*a, *b);
                assert!(d.is_finite(), "{:?} {:?}", a, b);
                assert!(d >= 0.0);
                assert!(d <= PI * EARTH_RADIUS_KM + 1e-6);
            }
        }
    }

    #[test]
    fn test_symmetric() {
        let pts = sample_points();
        for a in &pts {
            for b in &pts {
                assert_relative_eq!(
                    great_circle_distance_km(*a, *b),
                    great_circle_distance_km(*b, *a),
                    epsilon = 1e-9
                );
            }
        }
    }

    #[test]
    fn test_antipodes_half_circumference() {
        let d = great_circle_distance_km(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 180.0));
        assert_relative_eq!(d, PI * EARTH_RADIUS_KM, max_relative = 1e-9);
    }

    #[test]
    fn test_one_degree_of_longitude_on_equator() {
        let d = great_circle_distance_km(Coordinate::new(0.0, 10.0), Coordinate::new(0.0, 11.0));
        assert_relative_eq!(d, EARTH_RADIUS_KM * DEG, max_relative = 1e-6);
    }
}
