use crate::models::BoundingBox;

/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in kilometers
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair above 1 for antipodal points
    let c = 2.0 * a.min(1.0).sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Calculate a bounding box around a center point
///
/// Cheap pre-filter ahead of the exact Haversine check.
/// 1° latitude ≈ 111km, 1° longitude ≈ 111km * cos(latitude)
pub fn calculate_bounding_box(lat: f64, lon: f64, radius_km: f64) -> BoundingBox {
    let lat_delta = radius_km / 111.0;
    let lon_delta = radius_km / (111.0 * lat.to_radians().cos().abs());

    BoundingBox {
        min_lat: lat - lat_delta,
        max_lat: lat + lat_delta,
        min_lon: lon - lon_delta,
        max_lon: lon + lon_delta,
    }
}

/// Check if a point is within a bounding box (edges inclusive)
#[inline]
pub fn is_within_bounding_box(lat: f64, lon: f64, bbox: &BoundingBox) -> bool {
    lat >= bbox.min_lat && lat <= bbox.max_lat && lon >= bbox.min_lon && lon <= bbox.max_lon
}

/// Evenly spaced points strictly between `start` and `end`, by linear
/// interpolation of the coordinates
pub fn route_waypoints(start: (f64, f64), end: (f64, f64), count: usize) -> Vec<(f64, f64)> {
    let (start_lat, start_lon) = start;
    let (end_lat, end_lon) = end;

    (1..=count)
        .map(|i| {
            let ratio = i as f64 / (count + 1) as f64;
            (
                start_lat + (end_lat - start_lat) * ratio,
                start_lon + (end_lon - start_lon) * ratio,
            )
        })
        .collect()
}

/// Map zoom level that fits a bounding box
pub fn map_zoom_level(bbox: &BoundingBox) -> u8 {
    let span = (bbox.max_lat - bbox.min_lat).max(bbox.max_lon - bbox.min_lon);

    if span > 0.1 {
        10
    } else if span > 0.05 {
        12
    } else if span > 0.02 {
        14
    } else if span > 0.01 {
        15
    } else {
        16
    }
}

/// Human readable distance: meters below 500 m, kilometers otherwise
pub fn describe_distance(distance_km: f64) -> String {
    if distance_km < 0.5 {
        format!("{}公尺", (distance_km * 1000.0) as i64)
    } else {
        format!("{:.1}公里", distance_km)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_distance() {
        // Taipei 101 to Taipei Main Station, roughly 5 km
        let distance = haversine_distance(25.0340, 121.5645, 25.0478, 121.5170);
        assert!((distance - 5.0).abs() < 1.0, "Distance should be ~5km, got {}", distance);
    }

    #[test]
    fn test_haversine_same_point() {
        assert_eq!(haversine_distance(25.0330, 121.5654, 25.0330, 121.5654), 0.0);
    }

    #[test]
    fn test_bounding_box() {
        let bbox = calculate_bounding_box(25.0330, 121.5654, 10.0);

        assert!(bbox.min_lat < 25.0330);
        assert!(bbox.max_lat > 25.0330);
        assert!(bbox.min_lon < 121.5654);
        assert!(bbox.max_lon > 121.5654);

        let lat_span = bbox.max_lat - bbox.min_lat;
        assert!((lat_span - 0.18).abs() < 0.02, "Lat span should be ~0.18 degrees");
    }

    #[test]
    fn test_point_within_bbox() {
        let bbox = calculate_bounding_box(25.0330, 121.5654, 2.0);

        assert!(is_within_bounding_box(25.0330, 121.5654, &bbox));
        assert!(is_within_bounding_box(25.0400, 121.5600, &bbox));
        assert!(!is_within_bounding_box(25.1372, 121.5018, &bbox));
    }

    #[test]
    fn test_route_waypoints() {
        let points = route_waypoints((25.0, 121.5), (25.4, 121.9), 3);
        assert_eq!(points.len(), 3);
        assert!((points[0].0 - 25.1).abs() < 1e-9);
        assert!((points[1].1 - 121.7).abs() < 1e-9);
        assert!(route_waypoints((25.0, 121.5), (25.4, 121.9), 0).is_empty());
    }

    #[test]
    fn test_zoom_level() {
        let wide = calculate_bounding_box(25.0330, 121.5654, 20.0);
        assert_eq!(map_zoom_level(&wide), 10);

        let narrow = BoundingBox { min_lat: 25.0, max_lat: 25.005, min_lon: 121.5, max_lon: 121.505 };
        assert_eq!(map_zoom_level(&narrow), 16);
    }

    #[test]
    fn test_describe_distance() {
        assert_eq!(describe_distance(0.25), "250公尺");
        assert_eq!(describe_distance(0.75), "0.8公里");
        assert_eq!(describe_distance(3.14), "3.1公里");
    }
}
