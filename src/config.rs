use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::models::ScoringWeights;
use crate::services::LoadOptions;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub data: DataSettings,
    #[serde(default)]
    pub recommendation: RecommendationSettings,
    #[serde(default)]
    pub geo: GeoSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataSettings {
    #[serde(default = "default_venues_path")]
    pub venues_path: PathBuf,
    #[serde(default = "default_weather_path")]
    pub weather_path: PathBuf,
    #[serde(default = "default_skip_rows")]
    pub skip_rows: usize,
    /// Seed for the synthetic fields filled in at load time
    pub seed: Option<u64>,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            venues_path: default_venues_path(),
            weather_path: default_weather_path(),
            skip_rows: default_skip_rows(),
            seed: None,
        }
    }
}

impl DataSettings {
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            skip_rows: self.skip_rows,
            seed: self.seed,
        }
    }
}

fn default_venues_path() -> PathBuf { PathBuf::from("data/venues.csv") }
fn default_weather_path() -> PathBuf { PathBuf::from("data/weather.json") }
fn default_skip_rows() -> usize { 5 }

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationSettings {
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default = "default_diversity_weight")]
    pub diversity_weight: f64,
    #[serde(default)]
    pub weights: WeightsConfig,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            diversity_weight: default_diversity_weight(),
            weights: WeightsConfig::default(),
        }
    }
}

fn default_limit() -> usize { 10 }
fn default_diversity_weight() -> f64 { 0.3 }

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_preference_weight")]
    pub preference: f64,
    #[serde(default = "default_rating_weight")]
    pub rating: f64,
    #[serde(default = "default_price_weight")]
    pub price: f64,
    #[serde(default = "default_distance_weight")]
    pub distance: f64,
    #[serde(default = "default_facility_weight")]
    pub facility: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            preference: default_preference_weight(),
            rating: default_rating_weight(),
            price: default_price_weight(),
            distance: default_distance_weight(),
            facility: default_facility_weight(),
        }
    }
}

impl From<&WeightsConfig> for ScoringWeights {
    fn from(config: &WeightsConfig) -> Self {
        Self {
            preference: config.preference,
            rating: config.rating,
            price: config.price,
            distance: config.distance,
            facility: config.facility,
        }
    }
}

fn default_preference_weight() -> f64 { 0.30 }
fn default_rating_weight() -> f64 { 0.25 }
fn default_price_weight() -> f64 { 0.20 }
fn default_distance_weight() -> f64 { 0.15 }
fn default_facility_weight() -> f64 { 0.10 }

#[derive(Debug, Clone, Deserialize)]
pub struct GeoSettings {
    #[serde(default = "default_cluster_distance_km")]
    pub cluster_distance_km: f64,
}

impl Default for GeoSettings {
    fn default() -> Self {
        Self {
            cluster_distance_km: default_cluster_distance_km(),
        }
    }
}

fn default_cluster_distance_km() -> f64 { 0.5 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with VENUES__)
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., VENUES__DATA__SEED -> data.seed
            .add_source(environment())
            .build()?
            .try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?
            .try_deserialize()
    }
}

fn environment() -> Environment {
    Environment::with_prefix("VENUES")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_weights() {
        let weights = ScoringWeights::from(&WeightsConfig::default());
        assert_eq!(weights, ScoringWeights::default());
    }

    #[test]
    fn test_default_logging() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, "compact");
    }

    #[test]
    fn test_default_load_options() {
        let options = DataSettings::default().load_options();
        assert_eq!(options.skip_rows, 5);
        assert_eq!(options.seed, None);
    }

    #[test]
    fn test_load_from_partial_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[data]\nseed = 7\n\n[recommendation.weights]\nprice = 0.4\n\n[geo]\ncluster_distance_km = 1.0"
        )
        .unwrap();

        let settings = Settings::load_from(file.path()).unwrap();
        assert_eq!(settings.data.seed, Some(7));
        assert_eq!(settings.data.skip_rows, 5);
        assert_eq!(settings.recommendation.weights.price, 0.4);
        assert_eq!(settings.recommendation.weights.rating, 0.25);
        assert_eq!(settings.recommendation.default_limit, 10);
        assert_eq!(settings.geo.cluster_distance_km, 1.0);
        assert_eq!(settings.logging.level, "info");
    }
}
