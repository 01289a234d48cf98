// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    BoundingBox, District, FeedbackCounts, FeedbackKind, NearbyVenue, PriceRange,
    RecommendationResult, ScoreBreakdown, ScoringWeights, ScoringWeightsUpdate, Strategy,
    UnknownDistrict, UserPreferences, Venue, VenueId,
};
pub use requests::{RecommendRequest, VenueFilter};
pub use responses::{
    CategorySummary, CurrentWeather, HourlyForecast, RecommendationsResponse, VenueComparison,
    VenueStats,
};
