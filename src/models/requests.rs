use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};
use crate::models::domain::{District, PriceRange, Strategy, UserPreferences};

/// Venue filter; every supplied predicate must hold
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_filter_price_range"))]
pub struct VenueFilter {
    #[serde(rename = "sportTypes", default)]
    pub sport_types: Vec<String>,
    #[serde(default)]
    pub districts: Vec<District>,
    #[serde(rename = "priceRange", default)]
    pub price_range: Option<PriceRange>,
    #[serde(default)]
    pub facilities: Vec<String>,
    #[validate(range(min = 0.0, max = 5.0))]
    #[serde(rename = "minRating", default)]
    pub min_rating: f64,
    #[serde(rename = "searchQuery", default)]
    pub search_query: Option<String>,
}

impl VenueFilter {
    pub fn is_empty(&self) -> bool {
        self.sport_types.is_empty()
            && self.districts.is_empty()
            && self.price_range.is_none()
            && self.facilities.is_empty()
            && self.min_rating <= 0.0
            && self
                .search_query
                .as_deref()
                .map_or(true, |q| q.trim().is_empty())
    }
}

fn validate_filter_price_range(filter: &VenueFilter) -> Result<(), ValidationError> {
    match filter.price_range {
        Some(range) if range.min > range.max => Err(ValidationError::new("price_range_inverted")),
        _ => Ok(()),
    }
}

/// Request to run one recommendation strategy
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_preference_price_range"))]
pub struct RecommendRequest {
    pub strategy: Strategy,
    #[serde(default)]
    pub preferences: UserPreferences,
    #[validate(range(min = 1, max = 100))]
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(rename = "diversityWeight", default = "default_diversity_weight")]
    pub diversity_weight: f64,
}

impl RecommendRequest {
    pub fn new(strategy: Strategy, preferences: UserPreferences) -> Self {
        Self {
            strategy,
            preferences,
            limit: default_limit(),
            diversity_weight: default_diversity_weight(),
        }
    }
}

fn validate_preference_price_range(req: &RecommendRequest) -> Result<(), ValidationError> {
    let range = req.preferences.price_range;
    if range.min > range.max {
        return Err(ValidationError::new("price_range_inverted"));
    }
    Ok(())
}

fn default_limit() -> usize {
    10
}

fn default_diversity_weight() -> f64 {
    0.3
}
