use crate::models::{UserPreferences, Venue, VenueFilter};

/// Case-insensitive substring match over the searchable text fields
///
/// `query_lower` must already be lowercased and trimmed.
#[inline]
pub fn matches_search(venue: &Venue, query_lower: &str) -> bool {
    [
        venue.name.as_str(),
        venue.address.as_str(),
        venue.district.name(),
        venue.sport_type.as_str(),
        venue.facilities.as_str(),
        venue.description.as_str(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(query_lower))
}

/// Check a venue against every predicate supplied in the filter
pub fn matches_filter(venue: &Venue, filter: &VenueFilter) -> bool {
    if let Some(query) = filter.search_query.as_deref() {
        let query = query.trim().to_lowercase();
        if !query.is_empty() && !matches_search(venue, &query) {
            return false;
        }
    }

    if !filter.sport_types.is_empty() && !filter.sport_types.contains(&venue.sport_type) {
        return false;
    }

    if !filter.districts.is_empty() && !filter.districts.contains(&venue.district) {
        return false;
    }

    // Venues without a price never satisfy an explicit price range
    if let Some(range) = filter.price_range {
        match venue.price_per_hour {
            Some(price) if range.contains(price as f64) => {}
            _ => return false,
        }
    }

    if !filter.facilities.is_empty() {
        let facilities = venue.facilities.to_lowercase();
        if !filter
            .facilities
            .iter()
            .all(|wanted| facilities.contains(&wanted.trim().to_lowercase()))
        {
            return false;
        }
    }

    if filter.min_rating > 0.0 && venue.rating < filter.min_rating {
        return false;
    }

    true
}

/// Hard preference filter: preferred sport, preferred district and budget
///
/// Empty preference sets do not constrain; venues with no price pass the
/// budget check.
pub fn matches_preferences(venue: &Venue, preferences: &UserPreferences) -> bool {
    if !preferences.preferred_sports.is_empty() && !preferences.prefers_sport(&venue.sport_type) {
        return false;
    }

    if !preferences.preferred_districts.is_empty()
        && !preferences.prefers_district(venue.district)
    {
        return false;
    }

    match venue.price_per_hour {
        Some(price) => preferences.price_range.contains(price as f64),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{District, PriceRange};

    fn create_test_venue() -> Venue {
        Venue {
            id: 1,
            name: "Daan Sports Center".to_string(),
            district: District::Daan,
            sport_type: "游泳".to_string(),
            price_per_hour: Some(350),
            rating: 4.2,
            facilities: "淋浴間/置物櫃/Wi-Fi".to_string(),
            description: "室內溫水游泳池".to_string(),
            address: "臺北市大安區辛亥路三段55號".to_string(),
            contact_phone: String::new(),
            opening_hours: String::new(),
            website: String::new(),
            venue_scale: String::new(),
            courses: String::new(),
            photos: String::new(),
            latitude: 25.0263,
            longitude: 121.5436,
        }
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let venue = create_test_venue();
        assert!(matches_search(&venue, "sports"));
        assert!(matches_search(&venue, "wi-fi"));
        assert!(matches_search(&venue, "大安區"));
        assert!(matches_search(&venue, "溫水"));
        assert!(!matches_search(&venue, "籃球"));
    }

    #[test]
    fn test_empty_filter_matches() {
        assert!(matches_filter(&create_test_venue(), &VenueFilter::default()));
    }

    #[test]
    fn test_filter_price_range() {
        let venue = create_test_venue();
        let inside = VenueFilter {
            price_range: Some(PriceRange::new(300.0, 350.0)),
            ..Default::default()
        };
        let outside = VenueFilter {
            price_range: Some(PriceRange::new(0.0, 200.0)),
            ..Default::default()
        };
        assert!(matches_filter(&venue, &inside));
        assert!(!matches_filter(&venue, &outside));

        let mut unpriced = venue.clone();
        unpriced.price_per_hour = None;
        assert!(!matches_filter(&unpriced, &inside));
    }

    #[test]
    fn test_filter_requires_every_facility() {
        let venue = create_test_venue();
        let ok = VenueFilter {
            facilities: vec!["淋浴間".to_string(), "wi-fi".to_string()],
            ..Default::default()
        };
        let missing = VenueFilter {
            facilities: vec!["淋浴間".to_string(), "停車場".to_string()],
            ..Default::default()
        };
        assert!(matches_filter(&venue, &ok));
        assert!(!matches_filter(&venue, &missing));
    }

    #[test]
    fn test_filter_min_rating_and_district() {
        let venue = create_test_venue();
        let filter = VenueFilter {
            districts: vec![District::Xinyi],
            ..Default::default()
        };
        assert!(!matches_filter(&venue, &filter));

        let filter = VenueFilter {
            min_rating: 4.5,
            ..Default::default()
        };
        assert!(!matches_filter(&venue, &filter));
    }

    #[test]
    fn test_preference_filter() {
        let venue = create_test_venue();
        let mut prefs = UserPreferences::default();
        assert!(matches_preferences(&venue, &prefs));

        prefs.preferred_sports.insert("籃球".to_string());
        assert!(!matches_preferences(&venue, &prefs));

        prefs.preferred_sports.insert("游泳".to_string());
        prefs.price_range = PriceRange::new(0.0, 300.0);
        assert!(!matches_preferences(&venue, &prefs));
    }
}
