use crate::core::distance::{calculate_bounding_box, haversine_distance, is_within_bounding_box};
use crate::models::{BoundingBox, District, NearbyVenue, Venue, VenueId};

/// City-wide fallback centroid
pub const CITY_CENTER_NAME: &str = "台北市中心";
pub const CITY_CENTER: (f64, f64) = (25.0330, 121.5654);

/// Approximate Taipei city limits
pub const TAIPEI_BOUNDS: BoundingBox = BoundingBox {
    min_lat: 24.9,
    max_lat: 25.3,
    min_lon: 121.45,
    max_lon: 121.65,
};

impl District {
    /// District centroid as (latitude, longitude)
    pub fn center(&self) -> (f64, f64) {
        match self {
            District::Zhongzheng => (25.0320, 121.5200),
            District::Datong => (25.0632, 121.5138),
            District::Zhongshan => (25.0642, 121.5326),
            District::Songshan => (25.0497, 121.5746),
            District::Daan => (25.0263, 121.5436),
            District::Wanhua => (25.0338, 121.5014),
            District::Xinyi => (25.0308, 121.5645),
            District::Shilin => (25.0876, 121.5258),
            District::Beitou => (25.1174, 121.4985),
            District::Neihu => (25.0695, 121.5945),
            District::Nangang => (25.0547, 121.6066),
            District::Wenshan => (24.9887, 121.5706),
        }
    }
}

/// Centroid lookup by name; unknown names (including the city-wide
/// entry itself) resolve to the city center
pub fn district_center(name: &str) -> (f64, f64) {
    name.parse::<District>()
        .map(|d| d.center())
        .unwrap_or(CITY_CENTER)
}

/// ±0.01° box around a district centroid
pub fn district_bounds(name: &str) -> BoundingBox {
    let (lat, lon) = district_center(name);
    BoundingBox {
        min_lat: lat - 0.01,
        max_lat: lat + 0.01,
        min_lon: lon - 0.01,
        max_lon: lon + 0.01,
    }
}

#[inline]
pub fn is_within_taipei(lat: f64, lon: f64) -> bool {
    is_within_bounding_box(lat, lon, &TAIPEI_BOUNDS)
}

/// Closest venue to a point, linear scan
///
/// Returns `None` for an empty slice. Ties keep the earlier venue.
pub fn nearest_venue(venues: &[Venue], lat: f64, lon: f64) -> Option<NearbyVenue<'_>> {
    venues
        .iter()
        .map(|venue| NearbyVenue {
            venue,
            distance_km: haversine_distance(lat, lon, venue.latitude, venue.longitude),
        })
        .fold(None, |best: Option<NearbyVenue<'_>>, candidate| match best {
            Some(b) if b.distance_km <= candidate.distance_km => Some(b),
            _ => Some(candidate),
        })
}

/// Venues within `radius_km` of a point (inclusive), in input order
pub fn venues_in_radius(
    venues: &[Venue],
    lat: f64,
    lon: f64,
    radius_km: f64,
) -> Vec<NearbyVenue<'_>> {
    // Slightly padded box so the pre-filter never rejects a boundary hit
    let bbox = calculate_bounding_box(lat, lon, radius_km * 1.01);

    venues
        .iter()
        .filter(|venue| is_within_bounding_box(venue.latitude, venue.longitude, &bbox))
        .filter_map(|venue| {
            let distance_km = haversine_distance(lat, lon, venue.latitude, venue.longitude);
            (distance_km <= radius_km).then_some(NearbyVenue { venue, distance_km })
        })
        .collect()
}

/// Group venues by proximity
///
/// Single pass, first come first served: each unassigned venue seeds a
/// group and pulls in every other unassigned venue within
/// `max_distance_km` of the seed. Membership is not transitive, so two
/// venues close to each other can still land in different groups.
pub fn cluster_by_proximity(venues: &[Venue], max_distance_km: f64) -> Vec<Vec<VenueId>> {
    let mut assigned = vec![false; venues.len()];
    let mut clusters = Vec::new();

    for (i, seed) in venues.iter().enumerate() {
        if assigned[i] {
            continue;
        }
        assigned[i] = true;
        let mut members = vec![seed.id];

        for (j, other) in venues.iter().enumerate().skip(i + 1) {
            if assigned[j] {
                continue;
            }
            let distance = haversine_distance(
                seed.latitude,
                seed.longitude,
                other.latitude,
                other.longitude,
            );
            if distance <= max_distance_km {
                assigned[j] = true;
                members.push(other.id);
            }
        }

        clusters.push(members);
    }

    tracing::debug!("Grouped {} venues into {} proximity clusters", venues.len(), clusters.len());
    clusters
}
