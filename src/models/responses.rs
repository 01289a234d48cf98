use serde::{Deserialize, Serialize};
use crate::models::domain::{RecommendationResult, Strategy, Venue, VenueId};

/// Response for a recommendation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationsResponse {
    pub strategy: Strategy,
    pub results: Vec<RecommendationResult>,
    pub total_candidates: usize,
}

/// Catalogue-wide statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueStats {
    pub total_venues: usize,
    pub sport_types: usize,
    pub districts: usize,
    pub avg_price: f64,
}

/// Per-category aggregate (sport type or district)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: String,
    pub count: usize,
    pub avg_price: Option<f64>,
    pub avg_rating: f64,
}

/// Side-by-side comparison of a handful of venues
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueComparison {
    pub venues: Vec<Venue>,
    pub cheapest: Option<VenueId>,
    pub best_rated: Option<VenueId>,
    /// Every facility offered by at least one venue, with the ids offering it
    pub facilities: Vec<(String, Vec<VenueId>)>,
}

/// Current conditions for one district
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub district: String,
    pub temperature: i32,
    pub apparent_temperature: i32,
    pub humidity: i32,
    pub wind_direction: String,
    pub wind_speed: i32,
    pub precipitation_probability: i32,
    pub weather_description: String,
    pub comfort_index: String,
    pub update_time: String,
}

/// Single hourly temperature forecast entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecast {
    pub time: String,
    pub date: String,
    pub temperature: i32,
    pub hour: u32,
}
