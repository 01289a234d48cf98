use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Stable venue identifier (1-based source row position)
pub type VenueId = u32;

/// Taipei administrative district
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum District {
    #[serde(rename = "中正區")]
    Zhongzheng,
    #[serde(rename = "大同區")]
    Datong,
    #[serde(rename = "中山區")]
    Zhongshan,
    #[serde(rename = "松山區")]
    Songshan,
    #[serde(rename = "大安區")]
    Daan,
    #[serde(rename = "萬華區")]
    Wanhua,
    #[serde(rename = "信義區")]
    Xinyi,
    #[serde(rename = "士林區")]
    Shilin,
    #[serde(rename = "北投區")]
    Beitou,
    #[serde(rename = "內湖區")]
    Neihu,
    #[serde(rename = "南港區")]
    Nangang,
    #[serde(rename = "文山區")]
    Wenshan,
}

impl District {
    pub const ALL: [District; 12] = [
        District::Zhongzheng,
        District::Datong,
        District::Zhongshan,
        District::Songshan,
        District::Daan,
        District::Wanhua,
        District::Xinyi,
        District::Shilin,
        District::Beitou,
        District::Neihu,
        District::Nangang,
        District::Wenshan,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            District::Zhongzheng => "中正區",
            District::Datong => "大同區",
            District::Zhongshan => "中山區",
            District::Songshan => "松山區",
            District::Daan => "大安區",
            District::Wanhua => "萬華區",
            District::Xinyi => "信義區",
            District::Shilin => "士林區",
            District::Beitou => "北投區",
            District::Neihu => "內湖區",
            District::Nangang => "南港區",
            District::Wenshan => "文山區",
        }
    }

    /// Find the first district whose name appears in free text
    /// (e.g. "臺北市大安區復興南路").
    pub fn find_in(text: &str) -> Option<District> {
        District::ALL
            .iter()
            .copied()
            .find(|d| text.contains(d.name()))
    }
}

impl fmt::Display for District {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown district: {0}")]
pub struct UnknownDistrict(pub String);

impl FromStr for District {
    type Err = UnknownDistrict;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        District::ALL
            .iter()
            .copied()
            .find(|d| d.name() == trimmed)
            .ok_or_else(|| UnknownDistrict(trimmed.to_string()))
    }
}

/// Normalized venue record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub id: VenueId,
    pub name: String,
    pub district: District,
    #[serde(rename = "sportType")]
    pub sport_type: String,
    #[serde(rename = "pricePerHour", default)]
    pub price_per_hour: Option<u32>,
    pub rating: f64,
    pub facilities: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub address: String,
    #[serde(rename = "contactPhone", default)]
    pub contact_phone: String,
    #[serde(rename = "openingHours", default)]
    pub opening_hours: String,
    #[serde(default)]
    pub website: String,
    #[serde(rename = "venueScale", default)]
    pub venue_scale: String,
    #[serde(default)]
    pub courses: String,
    #[serde(default)]
    pub photos: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Venue {
    /// Individual facility names of the `/`-delimited facilities field
    pub fn facility_list(&self) -> impl Iterator<Item = &str> {
        self.facilities
            .split('/')
            .map(str::trim)
            .filter(|f| !f.is_empty())
    }
}

/// Inclusive price interval in NT$ per hour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }

    #[inline]
    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self { min: 0.0, max: 10000.0 }
    }
}

/// Session-scoped user preferences
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(rename = "preferredSports", default)]
    pub preferred_sports: BTreeSet<String>,
    #[serde(rename = "preferredDistricts", default)]
    pub preferred_districts: BTreeSet<District>,
    #[serde(rename = "priceRange", default)]
    pub price_range: PriceRange,
    #[serde(rename = "searchHistory", default)]
    pub search_history: Vec<String>,
    #[serde(default)]
    pub favorites: BTreeSet<VenueId>,
}

impl UserPreferences {
    #[inline]
    pub fn prefers_sport(&self, sport: &str) -> bool {
        self.preferred_sports.contains(sport)
    }

    #[inline]
    pub fn prefers_district(&self, district: District) -> bool {
        self.preferred_districts.contains(&district)
    }
}

/// Recommendation strategy selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Personalized,
    Trending,
    NewVenues,
    Collaborative,
    RatingBased,
    ClusterBased,
    ContentBased,
    MlBased,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Personalized => "personalized",
            Strategy::Trending => "trending",
            Strategy::NewVenues => "new_venues",
            Strategy::Collaborative => "collaborative",
            Strategy::RatingBased => "rating_based",
            Strategy::ClusterBased => "cluster_based",
            Strategy::ContentBased => "content_based",
            Strategy::MlBased => "ml_based",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const ALL: [Strategy; 8] = [
            Strategy::Personalized,
            Strategy::Trending,
            Strategy::NewVenues,
            Strategy::Collaborative,
            Strategy::RatingBased,
            Strategy::ClusterBased,
            Strategy::ContentBased,
            Strategy::MlBased,
        ];
        let wanted = s.trim().replace('-', "_");
        ALL.into_iter()
            .find(|strategy| strategy.as_str() == wanted)
            .ok_or_else(|| format!("unknown strategy: {}", s))
    }
}

/// Normalized [0, 1] components of the preference-weighted score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    #[serde(rename = "preferenceMatch")]
    pub preference_match: f64,
    #[serde(rename = "ratingWeight")]
    pub rating_weight: f64,
    #[serde(rename = "priceMatch")]
    pub price_match: f64,
    #[serde(rename = "distanceScore")]
    pub distance_score: f64,
    #[serde(rename = "facilityMatch")]
    pub facility_match: f64,
}

/// Scored recommendation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub venue: Venue,
    pub score: f64,
    pub reason: String,
    pub strategy: Strategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<ScoreBreakdown>,
}

/// Scoring weights of the preference-weighted strategy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub preference: f64,
    pub rating: f64,
    pub price: f64,
    pub distance: f64,
    pub facility: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            preference: 0.30,
            rating: 0.25,
            price: 0.20,
            distance: 0.15,
            facility: 0.10,
        }
    }
}

/// Partial weight override, merged by `Recommender::update_weights`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeightsUpdate {
    pub preference: Option<f64>,
    pub rating: Option<f64>,
    pub price: Option<f64>,
    pub distance: Option<f64>,
    pub facility: Option<f64>,
}

impl ScoringWeights {
    pub fn merge(&mut self, update: &ScoringWeightsUpdate) {
        if let Some(w) = update.preference {
            self.preference = w;
        }
        if let Some(w) = update.rating {
            self.rating = w;
        }
        if let Some(w) = update.price {
            self.price = w;
        }
        if let Some(w) = update.distance {
            self.distance = w;
        }
        if let Some(w) = update.facility {
            self.facility = w;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackKind {
    Like,
    Dislike,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackCounts {
    pub likes: u32,
    pub dislikes: u32,
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// Venue annotated with its distance from a query point
#[derive(Debug, Clone, Serialize)]
pub struct NearbyVenue<'a> {
    pub venue: &'a Venue,
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
}
