//! Venue Finder - search, weather and recommendation core for Taipei sports venues
//!
//! This library loads a flat venue file into an in-memory table, answers
//! filter and geo queries over it, looks up per-district weather from a
//! static forecast payload, and ranks venues with several recommendation
//! strategies.

pub mod config;
pub mod core;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use self::core::{
    distance::{calculate_bounding_box, haversine_distance},
    Recommender, RecommendError,
};
pub use models::{
    District, RecommendRequest, RecommendationResult, ScoringWeights, Strategy, UserPreferences,
    Venue, VenueFilter, VenueId,
};
pub use services::{LoadOptions, VenueStore, WeatherService};
