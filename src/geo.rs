//! Spherical geometry for the discovery radius.
//!
//! Distances are angles on a sphere of radius [`EARTH_RADIUS_KM`]. A search
//! radius of `d` kilometers is the spherical cap of angular radius
//! `d / EARTH_RADIUS_KM` around the center point.

use std::f64::consts::FRAC_PI_2;

use crate::models::GeoPoint;

pub const EARTH_RADIUS_KM: f64 = 6378.1;

pub fn km_to_radians(distance_km: f64) -> f64 {
    distance_km / EARTH_RADIUS_KM
}

/// Great-circle central angle between two points, in radians.
pub fn central_angle(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.latitude().to_radians();
    let lat2 = b.latitude().to_radians();
    let dlat = lat2 - lat1;
    let dlon = (b.longitude() - a.longitude()).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * h.sqrt().min(1.0).asin()
}

pub fn within_cap(center: &GeoPoint, radius_radians: f64, point: &GeoPoint) -> bool {
    central_angle(center, point) <= radius_radians
}

/// Axis-aligned prefilter that fully contains a spherical cap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    /// `None` when the cap reaches a pole or wraps the antimeridian.
    pub lon: Option<(f64, f64)>,
}

pub fn bounding_box(center: &GeoPoint, radius_radians: f64) -> BoundingBox {
    let lat = center.latitude().to_radians();
    let lon = center.longitude();
    let r = radius_radians.max(0.0);

    let min_lat = (lat - r).to_degrees();
    let max_lat = (lat + r).to_degrees();

    if lat + r >= FRAC_PI_2 || lat - r <= -FRAC_PI_2 {
        return BoundingBox {
            min_lat: min_lat.max(-90.0),
            max_lat: max_lat.min(90.0),
            lon: None,
        };
    }

    let ratio = r.sin() / lat.cos();
    if ratio >= 1.0 {
        return BoundingBox {
            min_lat,
            max_lat,
            lon: None,
        };
    }

    let dlon = ratio.asin().to_degrees();
    let lon_range = if lon - dlon < -180.0 || lon + dlon > 180.0 {
        None
    } else {
        Some((lon - dlon, lon + dlon))
    };

    BoundingBox {
        min_lat,
        max_lat,
        lon: lon_range,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lon: f64, lat: f64) -> GeoPoint {
        GeoPoint::new(lon, lat)
    }

    #[test]
    fn central_angle_of_same_point_is_zero() {
        let p = point(29.0, 41.0);
        assert!(central_angle(&p, &p).abs() < 1e-12);
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let km = central_angle(&point(0.0, 0.0), &point(0.0, 1.0)) * EARTH_RADIUS_KM;
        assert!((km - 111.3).abs() < 0.5, "got {km}");
    }

    #[test]
    fn longitude_degrees_shrink_with_latitude() {
        let at_equator = central_angle(&point(0.0, 0.0), &point(1.0, 0.0));
        let at_60 = central_angle(&point(0.0, 60.0), &point(1.0, 60.0));
        assert!((at_60 / at_equator - 0.5).abs() < 0.01);
    }

    #[test]
    fn within_cap_uses_spherical_distance() {
        let center = point(29.0, 41.0);
        let radius = km_to_radians(50.0);
        assert!(within_cap(&center, radius, &point(29.01, 41.01)));
        assert!(!within_cap(&center, radius, &point(36.0, 41.0)));
    }

    #[test]
    fn bounding_box_contains_cap_edge() {
        let center = point(29.0, 41.0);
        let radius = km_to_radians(50.0);
        let bbox = bounding_box(&center, radius);
        let (min_lon, max_lon) = bbox.lon.expect("lon range at mid latitude");

        let lat1 = center.latitude().to_radians();
        for deg in 0..360 {
            let bearing = f64::from(deg).to_radians();
            let lat2 = (lat1.sin() * radius.cos() + lat1.cos() * radius.sin() * bearing.cos()).asin();
            let dlon = (bearing.sin() * radius.sin() * lat1.cos())
                .atan2(radius.cos() - lat1.sin() * lat2.sin());
            let (lat, lon) = (lat2.to_degrees(), center.longitude() + dlon.to_degrees());

            let eps = 1e-9;
            assert!(lat >= bbox.min_lat - eps && lat <= bbox.max_lat + eps, "bearing {deg}");
            assert!(lon >= min_lon - eps && lon <= max_lon + eps, "bearing {deg}");
        }
    }

    #[test]
    fn bounding_box_drops_longitude_near_pole() {
        let bbox = bounding_box(&point(10.0, 89.9), km_to_radians(50.0));
        assert_eq!(bbox.lon, None);
        assert_eq!(bbox.max_lat, 90.0);
    }

    #[test]
    fn bounding_box_drops_longitude_across_antimeridian() {
        let bbox = bounding_box(&point(179.9, 0.0), km_to_radians(50.0));
        assert_eq!(bbox.lon, None);
    }
}
