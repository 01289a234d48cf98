// Core algorithm exports
pub mod distance;
pub mod filters;
pub mod forest;
pub mod geo;
pub mod kmeans;
pub mod recommender;
pub mod scoring;
pub mod tfidf;

pub use distance::{calculate_bounding_box, haversine_distance, is_within_bounding_box};
pub use filters::{matches_filter, matches_preferences, matches_search};
pub use geo::{cluster_by_proximity, district_center, nearest_venue, venues_in_radius};
pub use recommender::{RecommendError, Recommender};
pub use scoring::{composite_score, score_components};
