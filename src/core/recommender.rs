use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Beta, BetaError, Distribution};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;
use validator::Validate;

use crate::core::{
    filters::matches_preferences,
    forest::RegressionForest,
    kmeans::{feature_matrix, fit_kmeans, standardize},
    scoring::{
        apply_diversity, clamp_score, composite_score, max_rating, recommendation_reason,
        score_components, sport_histogram,
    },
    tfidf::{cosine_similarity, TfidfModel},
};
use crate::models::{
    District, FeedbackCounts, FeedbackKind, RecommendRequest, RecommendationResult,
    RecommendationsResponse, ScoringWeights, ScoringWeightsUpdate, Strategy, UserPreferences,
    Venue, VenueId,
};
use crate::services::VenueStore;

/// Errors raised inside a strategy before it falls back
#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("venue catalog is empty")]
    EmptyCatalog,

    #[error("need at least {needed} venues, found {found}")]
    TooFewVenues { needed: usize, found: usize },

    #[error("venue descriptions produced no terms")]
    EmptyVocabulary,

    #[error("no venue passed the similarity threshold")]
    NoSimilarVenues,

    #[error("clustering produced no usable cluster")]
    NoCluster,

    #[error("model training failed")]
    ModelTraining,

    #[error("invalid popularity distribution: {0}")]
    Distribution(#[from] BetaError),

    #[error("invalid request: {0}")]
    InvalidRequest(#[from] validator::ValidationErrors),
}

const TRENDING_SEED: u64 = 42;
const NEW_VENUES_SEED: u64 = 123;
const RATING_SEED: u64 = 42;
const CLUSTER_SEED: u64 = 42;
const FOREST_SEED: u64 = 42;

const POPULARITY_ALPHA: f64 = 2.0;
const POPULARITY_BETA: f64 = 5.0;

const PEER_COUNT: usize = 5;
const PEER_EXTRA_SPORTS: [&str; 5] = ["籃球", "足球", "網球", "羽毛球", "游泳"];
const PEER_EXTRA_DISTRICTS: [District; 4] = [
    District::Zhongzheng,
    District::Daan,
    District::Xinyi,
    District::Zhongshan,
];
const COLLABORATIVE_MIN_SCORE: f64 = 5.0;

const MAX_CLUSTERS: usize = 5;
const CLUSTER_RUNS: usize = 10;
const MIN_CLUSTER_VENUES: usize = 3;
const MAX_TERMS: usize = 100;
const CONTENT_MIN_SCORE: f64 = 3.0;
const DEFAULT_QUERY: &str = "運動場地";
const FOREST_TREES: usize = 50;
const FOREST_DEPTH: usize = 5;

const TRENDING_REASON: &str = "熱門場地 - 高評分且受歡迎";
const NEW_VENUE_REASON: &str = "新開放場地 - 值得探索";
const COLLABORATIVE_REASON: &str = "相似用戶推薦 - 與您喜好相似的用戶也喜歡這些場地";
const CLUSTER_REASON: &str = "聚類分析推薦 - 與您偏好相似的場地群組";
const CONTENT_REASON: &str = "內容相似性推薦 - 基於場地描述和特徵匹配";
const ML_REASON: &str = "機器學習模型推薦 - 基於數據模式分析";

/// Simulated like-minded user
#[derive(Debug, Clone)]
struct PeerProfile {
    sports: BTreeSet<String>,
    districts: BTreeSet<District>,
}

/// Recommendation orchestrator
///
/// Owns the scoring weights and the feedback ledger. The venue table and
/// the user's preferences are passed in on every call.
#[derive(Debug, Clone)]
pub struct Recommender {
    weights: ScoringWeights,
    feedback: HashMap<VenueId, FeedbackCounts>,
    peer_seed: Option<u64>,
}

impl Recommender {
    pub fn new(weights: ScoringWeights) -> Self {
        Self {
            weights,
            feedback: HashMap::new(),
            peer_seed: None,
        }
    }

    pub fn with_default_weights() -> Self {
        Self::new(ScoringWeights::default())
    }

    /// Seed the simulated peers of the collaborative strategy
    pub fn with_peer_seed(mut self, seed: u64) -> Self {
        self.peer_seed = Some(seed);
        self
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn update_weights(&mut self, update: &ScoringWeightsUpdate) {
        self.weights.merge(update);
        tracing::debug!("Scoring weights updated: {:?}", self.weights);
    }

    pub fn reset_weights(&mut self) {
        self.weights = ScoringWeights::default();
    }

    /// Nudge weights from keywords in the search history
    ///
    /// Each call applies the bumps again; they are not idempotent.
    pub fn update_from_history(&mut self, preferences: &UserPreferences) {
        let keywords: BTreeSet<String> = preferences
            .search_history
            .iter()
            .flat_map(|search| {
                search
                    .to_lowercase()
                    .split_whitespace()
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect();

        if keywords.contains("便宜") || keywords.contains("低價") {
            self.weights.price += 0.05;
        }
        if keywords.contains("高評分") || keywords.contains("好評") {
            self.weights.rating += 0.05;
        }
    }

    pub fn record_feedback(&mut self, venue_id: VenueId, kind: FeedbackKind) {
        let counts = self.feedback.entry(venue_id).or_default();
        match kind {
            FeedbackKind::Like => counts.likes += 1,
            FeedbackKind::Dislike => counts.dislikes += 1,
        }
    }

    pub fn feedback(&self, venue_id: VenueId) -> FeedbackCounts {
        self.feedback.get(&venue_id).copied().unwrap_or_default()
    }

    /// Validate a request and run the strategy it names
    pub fn recommend(
        &self,
        store: &VenueStore,
        request: &RecommendRequest,
    ) -> Result<RecommendationsResponse, RecommendError> {
        request.validate()?;

        let prefs = &request.preferences;
        let n = request.limit;
        let results = match request.strategy {
            Strategy::Personalized => self.personalized(store, prefs, n, request.diversity_weight),
            Strategy::Trending => self.trending(store, n),
            Strategy::NewVenues => self.new_venues(store, n),
            Strategy::Collaborative => self.collaborative(store, prefs, n),
            Strategy::RatingBased => self.rating_based(store, prefs, n),
            Strategy::ClusterBased => self.cluster_based(store, prefs, n),
            Strategy::ContentBased => self.content_based(store, prefs, n),
            Strategy::MlBased => self.ml_based(store, prefs, n),
        }
        .unwrap_or_default();

        tracing::info!(
            "Strategy {} returned {} of {} venues",
            request.strategy,
            results.len(),
            store.len()
        );

        Ok(RecommendationsResponse {
            strategy: request.strategy,
            results,
            total_candidates: store.len(),
        })
    }

    /// Preference-weighted composite score with an optional diversity penalty
    pub fn personalized(
        &self,
        store: &VenueStore,
        preferences: &UserPreferences,
        n: usize,
        diversity_weight: f64,
    ) -> Option<Vec<RecommendationResult>> {
        let venues = store.all();
        if venues.is_empty() {
            return None;
        }

        let max_rating = max_rating(venues);
        let breakdowns: Vec<_> = venues
            .iter()
            .map(|venue| score_components(venue, preferences, max_rating))
            .collect();

        let mut scored: Vec<(&Venue, f64)> = venues
            .iter()
            .zip(&breakdowns)
            .map(|(venue, breakdown)| (venue, composite_score(breakdown, &self.weights)))
            .collect();
        apply_diversity(&mut scored, &sport_histogram(venues), diversity_weight);

        let mut results: Vec<RecommendationResult> = scored
            .into_iter()
            .zip(breakdowns)
            .map(|((venue, score), breakdown)| RecommendationResult {
                venue: venue.clone(),
                score,
                reason: recommendation_reason(venue, preferences, &breakdown),
                strategy: Strategy::Personalized,
                breakdown: Some(breakdown),
            })
            .collect();

        rank(&mut results, n);
        Some(results)
    }

    /// Rating blended with a simulated popularity signal
    pub fn trending(&self, store: &VenueStore, n: usize) -> Option<Vec<RecommendationResult>> {
        or_none(Strategy::Trending, self.try_trending(store, n))
    }

    /// Simulated recently opened venues
    pub fn new_venues(&self, store: &VenueStore, n: usize) -> Option<Vec<RecommendationResult>> {
        or_none(Strategy::NewVenues, self.try_new_venues(store, n))
    }

    /// Venues liked by simulated users with similar preferences
    pub fn collaborative(
        &self,
        store: &VenueStore,
        preferences: &UserPreferences,
        n: usize,
    ) -> Option<Vec<RecommendationResult>> {
        or_none(Strategy::Collaborative, self.try_collaborative(store, preferences, n))
    }

    /// Best rated venues among those fitting the preferences
    pub fn rating_based(
        &self,
        store: &VenueStore,
        preferences: &UserPreferences,
        n: usize,
    ) -> Option<Vec<RecommendationResult>> {
        or_none(Strategy::RatingBased, self.try_rating_based(store, preferences, n))
    }

    /// Members of the k-means cluster closest to the preferences
    pub fn cluster_based(
        &self,
        store: &VenueStore,
        preferences: &UserPreferences,
        n: usize,
    ) -> Option<Vec<RecommendationResult>> {
        let outcome = self.try_cluster_based(store, preferences, n);
        self.or_fallback(Strategy::ClusterBased, outcome, store, preferences, n)
    }

    /// TF-IDF similarity between the preferences and venue text
    pub fn content_based(
        &self,
        store: &VenueStore,
        preferences: &UserPreferences,
        n: usize,
    ) -> Option<Vec<RecommendationResult>> {
        let outcome = self.try_content_based(store, preferences, n);
        self.or_fallback(Strategy::ContentBased, outcome, store, preferences, n)
    }

    /// Regression forest prediction with preference bonuses
    pub fn ml_based(
        &self,
        store: &VenueStore,
        preferences: &UserPreferences,
        n: usize,
    ) -> Option<Vec<RecommendationResult>> {
        let outcome = self.try_ml_based(store, preferences, n);
        self.or_fallback(Strategy::MlBased, outcome, store, preferences, n)
    }

    fn or_fallback(
        &self,
        strategy: Strategy,
        outcome: Result<Vec<RecommendationResult>, RecommendError>,
        store: &VenueStore,
        preferences: &UserPreferences,
        n: usize,
    ) -> Option<Vec<RecommendationResult>> {
        match outcome {
            Ok(results) if !results.is_empty() => Some(results),
            Err(RecommendError::EmptyCatalog) => None,
            Ok(_) => self.personalized(store, preferences, n, 0.0),
            Err(e) => {
                tracing::warn!("{} strategy failed, falling back to personalized: {}", strategy, e);
                self.personalized(store, preferences, n, 0.0)
            }
        }
    }

    fn try_trending(
        &self,
        store: &VenueStore,
        n: usize,
    ) -> Result<Vec<RecommendationResult>, RecommendError> {
        let venues = non_empty(store)?;
        let max_rating = max_rating(venues);
        let popularity = popularity_distribution()?;
        let mut rng = ChaCha8Rng::seed_from_u64(TRENDING_SEED);

        let mut results: Vec<RecommendationResult> = venues
            .iter()
            .map(|venue| {
                let rating_score = if max_rating > 0.0 { venue.rating / max_rating } else { 0.0 };
                let popularity = popularity.sample(&mut rng);
                let score = clamp_score((rating_score * 0.6 + popularity * 0.4) * 10.0);
                simple_result(venue, score, TRENDING_REASON.to_string(), Strategy::Trending)
            })
            .collect();

        rank(&mut results, n);
        Ok(results)
    }

    fn try_new_venues(
        &self,
        store: &VenueStore,
        n: usize,
    ) -> Result<Vec<RecommendationResult>, RecommendError> {
        let venues = non_empty(store)?;
        let amount = (venues.len() / 3).min(n.saturating_mul(2));
        if amount == 0 {
            return Err(RecommendError::TooFewVenues {
                needed: 3,
                found: venues.len(),
            });
        }

        let mut rng = ChaCha8Rng::seed_from_u64(NEW_VENUES_SEED);
        let chosen = index::sample(&mut rng, venues.len(), amount);

        let mut results: Vec<RecommendationResult> = chosen
            .iter()
            .map(|i| {
                let score = rng.gen_range(6.0..=9.0);
                simple_result(&venues[i], score, NEW_VENUE_REASON.to_string(), Strategy::NewVenues)
            })
            .collect();

        rank(&mut results, n);
        Ok(results)
    }

    fn try_collaborative(
        &self,
        store: &VenueStore,
        preferences: &UserPreferences,
        n: usize,
    ) -> Result<Vec<RecommendationResult>, RecommendError> {
        let venues = non_empty(store)?;
        let peers = self.simulated_peers(preferences);

        let mut results: Vec<RecommendationResult> = venues
            .iter()
            .map(|venue| (venue, collaborative_score(venue, &peers)))
            .filter(|(_, score)| *score >= COLLABORATIVE_MIN_SCORE)
            .map(|(venue, score)| {
                simple_result(
                    venue,
                    clamp_score(score),
                    COLLABORATIVE_REASON.to_string(),
                    Strategy::Collaborative,
                )
            })
            .collect();

        rank(&mut results, n);
        Ok(results)
    }

    fn simulated_peers(&self, preferences: &UserPreferences) -> Vec<PeerProfile> {
        let mut rng = match self.peer_seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        (0..PEER_COUNT)
            .map(|_| {
                let mut peer = PeerProfile {
                    sports: preferences.preferred_sports.clone(),
                    districts: preferences.preferred_districts.clone(),
                };

                if !preferences.preferred_sports.is_empty() {
                    for sport in PEER_EXTRA_SPORTS {
                        if !peer.sports.contains(sport) && rng.gen::<f64>() < 0.3 {
                            peer.sports.insert(sport.to_string());
                        }
                    }
                }

                if !preferences.preferred_districts.is_empty() {
                    for district in PEER_EXTRA_DISTRICTS {
                        if !peer.districts.contains(&district) && rng.gen::<f64>() < 0.2 {
                            peer.districts.insert(district);
                        }
                    }
                }

                peer
            })
            .collect()
    }

    fn try_rating_based(
        &self,
        store: &VenueStore,
        preferences: &UserPreferences,
        n: usize,
    ) -> Result<Vec<RecommendationResult>, RecommendError> {
        let venues = non_empty(store)?;
        let rated: Vec<&Venue> = venues.iter().filter(|v| v.rating > 0.0).collect();
        if rated.is_empty() {
            return Ok(Vec::new());
        }

        let mut candidates: Vec<&Venue> = rated
            .iter()
            .copied()
            .filter(|venue| matches_preferences(venue, preferences))
            .collect();
        if candidates.is_empty() {
            tracing::debug!("No rated venue fits the preferences, using all rated venues");
            candidates = rated;
        }

        // Stable sort keeps table order among equal ratings
        candidates.sort_by(|a, b| b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal));

        let mut rng = ChaCha8Rng::seed_from_u64(RATING_SEED);
        let mut results: Vec<RecommendationResult> = candidates
            .into_iter()
            .map(|venue| {
                let score = clamp_score(venue.rating / 5.0 * 8.0 + rng.gen_range(0.0..2.0));
                simple_result(
                    venue,
                    score,
                    format!("高評分場地 - 平均評分 {:.1}/5.0", venue.rating),
                    Strategy::RatingBased,
                )
            })
            .collect();

        results.truncate(n);
        Ok(results)
    }

    fn try_cluster_based(
        &self,
        store: &VenueStore,
        preferences: &UserPreferences,
        n: usize,
    ) -> Result<Vec<RecommendationResult>, RecommendError> {
        let venues = non_empty(store)?;
        if venues.len() < MIN_CLUSTER_VENUES {
            return Err(RecommendError::TooFewVenues {
                needed: MIN_CLUSTER_VENUES,
                found: venues.len(),
            });
        }

        let mut features =
            feature_matrix(&cluster_features(venues)).ok_or(RecommendError::NoCluster)?;
        standardize(&mut features);

        let k = (venues.len() / 2).min(MAX_CLUSTERS);
        let fit = fit_kmeans(&features, k, CLUSTER_RUNS, CLUSTER_SEED)
            .ok_or(RecommendError::NoCluster)?;

        let cluster = best_cluster(venues, &fit.labels, preferences).ok_or(RecommendError::NoCluster)?;
        tracing::debug!(
            "Chose cluster {} of {} (inertia {:.3})",
            cluster,
            k,
            fit.inertia
        );

        let mut rng = ChaCha8Rng::seed_from_u64(CLUSTER_SEED);

        let mut results: Vec<RecommendationResult> = venues
            .iter()
            .zip(&fit.labels)
            .filter(|(_, &label)| label == cluster)
            .map(|(venue, _)| {
                let score = clamp_score(rng.gen_range(6.0..9.5) + venue.rating * 0.5);
                simple_result(venue, score, CLUSTER_REASON.to_string(), Strategy::ClusterBased)
            })
            .collect();

        rank(&mut results, n);
        Ok(results)
    }

    fn try_content_based(
        &self,
        store: &VenueStore,
        preferences: &UserPreferences,
        n: usize,
    ) -> Result<Vec<RecommendationResult>, RecommendError> {
        let venues = non_empty(store)?;
        let documents: Vec<String> = venues
            .iter()
            .map(|v| format!("{} {} {} {}", v.name, v.sport_type, v.district, v.description))
            .collect();

        let model = TfidfModel::fit(&documents, MAX_TERMS).ok_or(RecommendError::EmptyVocabulary)?;
        let query = model.transform(&user_query(preferences));

        let mut results: Vec<RecommendationResult> = venues
            .iter()
            .zip(&documents)
            .filter_map(|(venue, document)| {
                let similarity = cosine_similarity(&query, &model.transform(document));
                let score = similarity * 10.0 + venue.rating * 0.3;
                (score >= CONTENT_MIN_SCORE).then(|| {
                    simple_result(
                        venue,
                        clamp_score(score),
                        CONTENT_REASON.to_string(),
                        Strategy::ContentBased,
                    )
                })
            })
            .collect();

        if results.is_empty() {
            return Err(RecommendError::NoSimilarVenues);
        }

        rank(&mut results, n);
        Ok(results)
    }

    fn try_ml_based(
        &self,
        store: &VenueStore,
        preferences: &UserPreferences,
        n: usize,
    ) -> Result<Vec<RecommendationResult>, RecommendError> {
        let venues = non_empty(store)?;

        let sport_codes = label_codes(venues.iter().map(|v| v.sport_type.as_str()));
        let district_codes = label_codes(venues.iter().map(|v| v.district));

        let rows: Vec<Vec<f64>> = venues
            .iter()
            .map(|v| {
                vec![
                    v.price_per_hour.map_or(0.0, f64::from),
                    v.rating,
                    sport_codes[v.sport_type.as_str()],
                    district_codes[&v.district],
                ]
            })
            .collect();
        let targets: Vec<f64> = venues
            .iter()
            .map(|v| {
                let price = v.price_per_hour.map_or(500.0, f64::from);
                (v.rating + 10.0 - price / 100.0).clamp(0.0, 10.0)
            })
            .collect();

        let mut rng = ChaCha8Rng::seed_from_u64(FOREST_SEED);
        let forest = RegressionForest::fit(&rows, &targets, FOREST_TREES, FOREST_DEPTH, &mut rng)
            .ok_or(RecommendError::ModelTraining)?;

        let mut results: Vec<RecommendationResult> = venues
            .iter()
            .zip(&rows)
            .map(|(venue, row)| {
                let mut score = forest.predict(row);
                if preferences.prefers_sport(&venue.sport_type) {
                    score += 2.0;
                }
                if preferences.prefers_district(venue.district) {
                    score += 1.5;
                }
                simple_result(venue, clamp_score(score), ML_REASON.to_string(), Strategy::MlBased)
            })
            .collect();

        rank(&mut results, n);
        Ok(results)
    }
}

impl Default for Recommender {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

fn or_none(
    strategy: Strategy,
    outcome: Result<Vec<RecommendationResult>, RecommendError>,
) -> Option<Vec<RecommendationResult>> {
    match outcome {
        Ok(results) if !results.is_empty() => Some(results),
        Ok(_) | Err(RecommendError::EmptyCatalog) => None,
        Err(e) => {
            tracing::warn!("{} strategy produced nothing: {}", strategy, e);
            None
        }
    }
}

fn non_empty(store: &VenueStore) -> Result<&[Venue], RecommendError> {
    if store.is_empty() {
        Err(RecommendError::EmptyCatalog)
    } else {
        Ok(store.all())
    }
}

fn simple_result(
    venue: &Venue,
    score: f64,
    reason: String,
    strategy: Strategy,
) -> RecommendationResult {
    RecommendationResult {
        venue: venue.clone(),
        score,
        reason,
        strategy,
        breakdown: None,
    }
}

/// Sort by score (descending), then rating (descending), then id, and
/// keep the first `n`
fn rank(results: &mut Vec<RecommendationResult>, n: usize) {
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                b.venue
                    .rating
                    .partial_cmp(&a.venue.rating)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| a.venue.id.cmp(&b.venue.id))
    });
    results.truncate(n);
}

/// Simulated popularity, skewed towards unpopular
fn popularity_distribution() -> Result<Beta<f64>, RecommendError> {
    Ok(Beta::new(POPULARITY_ALPHA, POPULARITY_BETA)?)
}

fn collaborative_score(venue: &Venue, peers: &[PeerProfile]) -> f64 {
    let (total, matching) = peers
        .iter()
        .map(|peer| {
            let mut score = 0.0;
            if peer.sports.contains(&venue.sport_type) {
                score += 3.0;
            }
            if peer.districts.contains(&venue.district) {
                score += 2.0;
            }
            score + venue.rating * 0.5
        })
        .filter(|&score| score > 0.0)
        .fold((0.0, 0usize), |(total, count), score| (total + score, count + 1));

    if matching > 0 {
        total / matching as f64
    } else {
        COLLABORATIVE_MIN_SCORE
    }
}

/// Price, rating and one-hot sport and district columns
fn cluster_features(venues: &[Venue]) -> Vec<Vec<f64>> {
    let mut prices: Vec<f64> = venues
        .iter()
        .filter_map(|v| v.price_per_hour.map(f64::from))
        .collect();
    prices.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let median = median(&prices);

    let sports: Vec<&str> = venues
        .iter()
        .map(|v| v.sport_type.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let districts: Vec<District> = venues
        .iter()
        .map(|v| v.district)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    venues
        .iter()
        .map(|venue| {
            let mut row = vec![venue.price_per_hour.map_or(median, f64::from), venue.rating];
            row.extend(sports.iter().map(|s| f64::from(u8::from(*s == venue.sport_type))));
            row.extend(districts.iter().map(|d| f64::from(u8::from(*d == venue.district))));
            row
        })
        .collect()
}

fn median(sorted: &[f64]) -> f64 {
    match sorted.len() {
        0 => 0.0,
        len if len % 2 == 1 => sorted[len / 2],
        len => (sorted[len / 2 - 1] + sorted[len / 2]) / 2.0,
    }
}

/// Cluster with the best preference overlap; the earliest seen label wins ties
fn best_cluster(venues: &[Venue], labels: &[usize], preferences: &UserPreferences) -> Option<usize> {
    let mut order: Vec<usize> = Vec::new();
    for &label in labels {
        if !order.contains(&label) {
            order.push(label);
        }
    }

    let mut best: Option<(usize, f64)> = None;
    for label in order {
        let members: Vec<&Venue> = venues
            .iter()
            .zip(labels)
            .filter(|(_, &l)| l == label)
            .map(|(v, _)| v)
            .collect();
        let size = members.len() as f64;

        let mut score = 0.0;
        if !preferences.preferred_sports.is_empty() {
            let matches = members.iter().filter(|v| preferences.prefers_sport(&v.sport_type)).count();
            score += matches as f64 / size * 3.0;
        }
        if !preferences.preferred_districts.is_empty() {
            let matches = members.iter().filter(|v| preferences.prefers_district(v.district)).count();
            score += matches as f64 / size * 2.0;
        }
        score += members.iter().map(|v| v.rating).sum::<f64>() / size * 0.5;

        if best.map_or(true, |(_, s)| score > s) {
            best = Some((label, score));
        }
    }

    best.map(|(label, _)| label)
}

/// Codes from the sorted unique values
fn label_codes<T: Ord + std::hash::Hash + Copy>(values: impl Iterator<Item = T>) -> HashMap<T, f64> {
    values
        .collect::<BTreeSet<_>>()
        .into_iter()
        .enumerate()
        .map(|(code, value)| (value, code as f64))
        .collect()
}

fn user_query(preferences: &UserPreferences) -> String {
    let parts: Vec<&str> = preferences
        .preferred_sports
        .iter()
        .map(String::as_str)
        .chain(preferences.preferred_districts.iter().map(|d| d.name()))
        .collect();

    if parts.is_empty() {
        DEFAULT_QUERY.to_string()
    } else {
        parts.join(" ")
    }
}
