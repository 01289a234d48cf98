use std::collections::HashMap;

use crate::models::{ScoreBreakdown, ScoringWeights, UserPreferences, Venue};

/// Upper bound of every recommendation score
pub const MAX_SCORE: f64 = 10.0;

/// Reason used when no specific component stands out
pub const GENERAL_REASON: &str = "綜合評估推薦";

const FACILITY_MATCH: f64 = 0.7;
const MAX_DIVERSITY_PENALTY: f64 = 2.0;

/// Calculate the normalized [0, 1] components of a venue's score
///
/// Scoring components:
/// - preference_match: mean of sport match (1.0 / 0.5, 0.7 without a sport
///   preference) and district match (1.0 / 0.3, 0.7 without a district
///   preference)
/// - rating_weight: rating relative to the best rating in the table
/// - price_match: 1.0 inside the budget, decaying with distance from its
///   midpoint outside it
/// - distance_score: district proximity proxy (1.0 / 0.4, 0.7 neutral)
/// - facility_match: constant 0.7
pub fn score_components(
    venue: &Venue,
    preferences: &UserPreferences,
    max_rating: f64,
) -> ScoreBreakdown {
    let has_sports = !preferences.preferred_sports.is_empty();
    let has_districts = !preferences.preferred_districts.is_empty();
    let preferred_district = preferences.prefers_district(venue.district);

    let sport_match = match (has_sports, preferences.prefers_sport(&venue.sport_type)) {
        (false, _) => 0.7,
        (true, true) => 1.0,
        (true, false) => 0.5,
    };
    let district_match = match (has_districts, preferred_district) {
        (false, _) => 0.7,
        (true, true) => 1.0,
        (true, false) => 0.3,
    };
    let distance_score = match (has_districts, preferred_district) {
        (false, _) => 0.7,
        (true, true) => 1.0,
        (true, false) => 0.4,
    };

    ScoreBreakdown {
        preference_match: (sport_match + district_match) / 2.0,
        rating_weight: rating_weight(venue.rating, max_rating),
        price_match: price_match(venue.price_per_hour, preferences),
        distance_score,
        facility_match: FACILITY_MATCH,
    }
}

/// Weighted sum of the components on the 0-10 scale
#[inline]
pub fn composite_score(breakdown: &ScoreBreakdown, weights: &ScoringWeights) -> f64 {
    let total = (breakdown.preference_match * weights.preference
        + breakdown.rating_weight * weights.rating
        + breakdown.price_match * weights.price
        + breakdown.distance_score * weights.distance
        + breakdown.facility_match * weights.facility)
        * 10.0;

    clamp_score(total)
}

#[inline]
pub fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, MAX_SCORE)
}

/// Best rating in the table, 0.0 when empty
pub fn max_rating(venues: &[Venue]) -> f64 {
    venues.iter().map(|v| v.rating).fold(0.0, f64::max)
}

#[inline]
fn rating_weight(rating: f64, max_rating: f64) -> f64 {
    if max_rating > 0.0 {
        rating / max_rating
    } else {
        0.5
    }
}

#[inline]
fn price_match(price: Option<u32>, preferences: &UserPreferences) -> f64 {
    let range = preferences.price_range;
    match price {
        None => 1.0,
        Some(p) if range.contains(p as f64) => 1.0,
        Some(_) if range.max <= 0.0 => 0.0,
        Some(p) => (1.0 - (p as f64 - range.midpoint()).abs() / range.max).max(0.0),
    }
}

/// Counts how many venues fall under each sport type
pub fn sport_histogram(venues: &[Venue]) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for venue in venues {
        *counts.entry(venue.sport_type.as_str()).or_insert(0) += 1;
    }
    counts
}

/// Penalty for a venue whose sport type has `group_size` members
#[inline]
pub fn diversity_penalty(diversity_weight: f64, group_size: usize) -> f64 {
    let extra = group_size.saturating_sub(1) as f64;
    (diversity_weight * extra * 0.1).min(MAX_DIVERSITY_PENALTY)
}

/// Apply the sport-type diversity penalty to scored venues in place
///
/// Group sizes are counted over the whole table, not just the scored
/// slice. Scores never drop below zero.
pub fn apply_diversity(
    scored: &mut [(&Venue, f64)],
    sport_counts: &HashMap<&str, usize>,
    diversity_weight: f64,
) {
    if diversity_weight <= 0.0 {
        return;
    }

    for (venue, score) in scored.iter_mut() {
        let group_size = sport_counts.get(venue.sport_type.as_str()).copied().unwrap_or(1);
        *score = (*score - diversity_penalty(diversity_weight, group_size)).max(0.0);
    }
}

/// Human readable reasons, joined with ` • `
pub fn recommendation_reason(
    venue: &Venue,
    preferences: &UserPreferences,
    breakdown: &ScoreBreakdown,
) -> String {
    let mut reasons = Vec::new();

    if breakdown.preference_match > 0.8 {
        if preferences.prefers_sport(&venue.sport_type) {
            reasons.push(format!("符合您偏好的{}", venue.sport_type));
        }
        if preferences.prefers_district(venue.district) {
            reasons.push(format!("位於您偏好的{}", venue.district));
        }
    }

    if breakdown.rating_weight > 0.8 {
        reasons.push(format!("高評分場地({:.1}/5.0)", venue.rating));
    }

    if breakdown.price_match > 0.8 {
        reasons.push("價格符合您的預算".to_string());
    }

    if reasons.is_empty() {
        GENERAL_REASON.to_string()
    } else {
        reasons.join(" • ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{District, PriceRange};

    fn create_test_venue(sport: &str, district: District, price: Option<u32>, rating: f64) -> Venue {
        Venue {
            id: 1,
            name: "Test Venue".to_string(),
            district,
            sport_type: sport.to_string(),
            price_per_hour: price,
            rating,
            facilities: "停車場".to_string(),
            description: String::new(),
            address: String::new(),
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

    fn basketball_in_daan() -> UserPreferences {
        let mut prefs = UserPreferences::default();
        prefs.preferred_sports.insert("籃球".to_string());
        prefs.preferred_districts.insert(District::Daan);
        prefs.price_range = PriceRange::new(0.0, 500.0);
        prefs
    }

    #[test]
    fn test_components_for_full_match() {
        let venue = create_test_venue("籃球", District::Daan, Some(300), 4.5);
        let breakdown = score_components(&venue, &basketball_in_daan(), 5.0);

        assert_eq!(breakdown.preference_match, 1.0);
        assert_eq!(breakdown.distance_score, 1.0);
        assert_eq!(breakdown.price_match, 1.0);
        assert!((breakdown.rating_weight - 0.9).abs() < 1e-9);
        assert_eq!(breakdown.facility_match, 0.7);
    }

    #[test]
    fn test_components_without_preferences() {
        let venue = create_test_venue("游泳", District::Xinyi, None, 4.0);
        let breakdown = score_components(&venue, &UserPreferences::default(), 0.0);

        assert_eq!(breakdown.preference_match, 0.7);
        assert_eq!(breakdown.distance_score, 0.7);
        assert_eq!(breakdown.price_match, 1.0);
        assert_eq!(breakdown.rating_weight, 0.5);
    }

    #[test]
    fn test_price_match_outside_budget() {
        let prefs = basketball_in_daan();
        // midpoint 250, max 500: 1 - 450/500
        let venue = create_test_venue("籃球", District::Daan, Some(700), 4.0);
        let breakdown = score_components(&venue, &prefs, 5.0);
        assert!((breakdown.price_match - 0.1).abs() < 1e-9);

        let far = create_test_venue("籃球", District::Daan, Some(2000), 4.0);
        assert_eq!(score_components(&far, &prefs, 5.0).price_match, 0.0);
    }

    #[test]
    fn test_composite_is_bounded() {
        let venue = create_test_venue("籃球", District::Daan, Some(300), 5.0);
        let breakdown = score_components(&venue, &basketball_in_daan(), 5.0);
        let heavy = ScoringWeights {
            preference: 2.0,
            rating: 2.0,
            price: 2.0,
            distance: 2.0,
            facility: 2.0,
        };
        assert_eq!(composite_score(&breakdown, &heavy), MAX_SCORE);

        let default_score = composite_score(&breakdown, &ScoringWeights::default());
        assert!(default_score > 9.0 && default_score <= MAX_SCORE);
    }

    #[test]
    fn test_higher_rating_scores_higher() {
        let prefs = basketball_in_daan();
        let weights = ScoringWeights::default();
        let low = create_test_venue("籃球", District::Daan, Some(300), 3.5);
        let high = create_test_venue("籃球", District::Daan, Some(300), 4.8);

        let low_score = composite_score(&score_components(&low, &prefs, 5.0), &weights);
        let high_score = composite_score(&score_components(&high, &prefs, 5.0), &weights);
        assert!(high_score > low_score);
    }

    #[test]
    fn test_diversity_penalty() {
        assert_eq!(diversity_penalty(0.3, 1), 0.0);
        assert!((diversity_penalty(0.3, 11) - 0.3).abs() < 1e-9);
        assert_eq!(diversity_penalty(1.0, 500), 2.0);
    }

    #[test]
    fn test_sport_histogram() {
        let venues = vec![
            create_test_venue("籃球", District::Daan, None, 4.0),
            create_test_venue("籃球", District::Xinyi, None, 4.0),
            create_test_venue("游泳", District::Daan, None, 4.0),
        ];
        let counts = sport_histogram(&venues);
        assert_eq!(counts.get("籃球"), Some(&2));
        assert_eq!(counts.get("游泳"), Some(&1));
    }

    #[test]
    fn test_apply_diversity_floors_at_zero() {
        let venue = create_test_venue("籃球", District::Daan, Some(300), 4.0);
        let mut counts = HashMap::new();
        counts.insert("籃球", 100);

        let mut scored = vec![(&venue, 1.0)];
        apply_diversity(&mut scored, &counts, 1.0);
        assert_eq!(scored[0].1, 0.0);

        let mut untouched = vec![(&venue, 1.0)];
        apply_diversity(&mut untouched, &counts, 0.0);
        assert_eq!(untouched[0].1, 1.0);
    }

    #[test]
    fn test_reason_lists_matches() {
        let prefs = basketball_in_daan();
        let venue = create_test_venue("籃球", District::Daan, Some(300), 4.5);
        let breakdown = score_components(&venue, &prefs, 5.0);

        let reason = recommendation_reason(&venue, &prefs, &breakdown);
        assert_eq!(
            reason,
            "符合您偏好的籃球 • 位於您偏好的大安區 • 高評分場地(4.5/5.0) • 價格符合您的預算"
        );
    }

    #[test]
    fn test_reason_fallback() {
        let prefs = basketball_in_daan();
        let venue = create_test_venue("游泳", District::Xinyi, Some(3000), 3.5);
        let breakdown = score_components(&venue, &prefs, 5.0);
        assert_eq!(recommendation_reason(&venue, &prefs, &breakdown), GENERAL_REASON);
    }
}
