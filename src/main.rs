use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use venue_finder::config::Settings;
use venue_finder::core::geo::{cluster_by_proximity, nearest_venue, venues_in_radius};
use venue_finder::models::{
    CurrentWeather, District, HourlyForecast, PriceRange, RecommendRequest, ScoringWeights,
    Strategy, UserPreferences, VenueFilter, VenueId,
};
use venue_finder::services::weather::{exercise_advice, weather_icon};
use venue_finder::{Recommender, VenueStore, WeatherService};

#[derive(Parser)]
#[command(name = "venue-finder")]
#[command(about = "Search, weather and recommendations for Taipei sports venues", long_about = None)]
struct Cli {
    /// Configuration file (defaults to config/default.toml and config/local.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter and search venues
    Search {
        /// Free-text query over name, address, district, sport, facilities
        #[arg(long)]
        query: Option<String>,
        #[arg(long = "sport")]
        sports: Vec<String>,
        #[arg(long = "district")]
        districts: Vec<District>,
        #[arg(long)]
        min_price: Option<f64>,
        #[arg(long)]
        max_price: Option<f64>,
        #[arg(long = "facility")]
        facilities: Vec<String>,
        #[arg(long, default_value_t = 0.0)]
        min_rating: f64,
    },
    /// Rank venues with one of the recommendation strategies
    Recommend {
        #[arg(long, default_value = "personalized")]
        strategy: Strategy,
        #[arg(long = "sport")]
        sports: Vec<String>,
        #[arg(long = "district")]
        districts: Vec<District>,
        #[arg(long)]
        min_price: Option<f64>,
        #[arg(long)]
        max_price: Option<f64>,
        /// Past searches, used to adjust the scoring weights
        #[arg(long = "history")]
        history: Vec<String>,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        diversity: Option<f64>,
    },
    /// Current conditions and hourly forecast for a district
    Weather {
        #[arg(long, default_value = "中正區")]
        district: String,
        #[arg(long, default_value_t = 24)]
        hours: usize,
    },
    /// Nearest venue to a point, or every venue within a radius
    Nearby {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        #[arg(long)]
        radius_km: Option<f64>,
    },
    /// Group venues that sit close to each other
    Clusters {
        #[arg(long)]
        distance_km: Option<f64>,
    },
    /// Catalogue statistics and per-category summaries
    Stats,
    /// Side-by-side comparison of two to five venues
    Compare {
        #[arg(required = true, num_args = 2..=5)]
        ids: Vec<VenueId>,
    },
}

#[derive(Serialize)]
struct WeatherReport {
    current: CurrentWeather,
    icon: &'static str,
    advice: &'static str,
    hourly: Vec<HourlyForecast>,
}

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .context("failed to load configuration")?;

    init_logging(&settings);
    info!("Configuration loaded successfully");

    match cli.command {
        Commands::Search {
            query,
            sports,
            districts,
            min_price,
            max_price,
            facilities,
            min_rating,
        } => {
            let store = load_store(&settings);
            let filter = VenueFilter {
                sport_types: sports,
                districts,
                price_range: price_range(min_price, max_price),
                facilities,
                min_rating,
                search_query: query,
            };
            validator::Validate::validate(&filter).context("invalid filter")?;

            let venues = store.filter(&filter);
            info!("Search matched {} of {} venues", venues.len(), store.len());
            print_json(&venues)?;
        }
        Commands::Recommend {
            strategy,
            sports,
            districts,
            min_price,
            max_price,
            history,
            limit,
            diversity,
        } => {
            let store = load_store(&settings);
            let preferences = UserPreferences {
                preferred_sports: sports.into_iter().collect(),
                preferred_districts: districts.into_iter().collect(),
                price_range: price_range(min_price, max_price).unwrap_or_default(),
                search_history: history,
                ..Default::default()
            };

            let mut recommender =
                Recommender::new(ScoringWeights::from(&settings.recommendation.weights));
            recommender.update_from_history(&preferences);
            info!("Recommender initialized with weights: {:?}", recommender.weights());

            let mut request = RecommendRequest::new(strategy, preferences);
            request.limit = limit.unwrap_or(settings.recommendation.default_limit);
            request.diversity_weight = diversity.unwrap_or(settings.recommendation.diversity_weight);

            let response = recommender
                .recommend(&store, &request)
                .context("recommendation request rejected")?;
            print_json(&response)?;
        }
        Commands::Weather { district, hours } => {
            let weather = WeatherService::load_or_empty(&settings.data.weather_path);
            let current = weather.current_weather(&district);
            let report = WeatherReport {
                icon: weather_icon(&current.weather_description, current.temperature),
                advice: exercise_advice(
                    current.temperature,
                    current.humidity,
                    current.precipitation_probability,
                ),
                hourly: weather.hourly_forecast(&district, hours),
                current,
            };
            print_json(&report)?;
        }
        Commands::Nearby { lat, lon, radius_km } => {
            let store = load_store(&settings);
            match radius_km {
                Some(radius) => print_json(&venues_in_radius(store.all(), lat, lon, radius))?,
                None => print_json(&nearest_venue(store.all(), lat, lon))?,
            }
        }
        Commands::Clusters { distance_km } => {
            let store = load_store(&settings);
            let distance = distance_km.unwrap_or(settings.geo.cluster_distance_km);
            print_json(&cluster_by_proximity(store.all(), distance))?;
        }
        Commands::Stats => {
            let store = load_store(&settings);
            print_json(&serde_json::json!({
                "stats": store.stats(),
                "sports": store.sport_summary(),
                "districts": store.district_summary(),
                "popularSearches": store.popular_searches(),
            }))?;
        }
        Commands::Compare { ids } => {
            let store = load_store(&settings);
            let comparison = store.compare(&ids).context("comparison failed")?;
            print_json(&comparison)?;
        }
    }

    Ok(())
}

fn init_logging(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));

    // Logs go to stderr so stdout carries only JSON
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true);

    if settings.logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }
}

fn load_store(settings: &Settings) -> VenueStore {
    VenueStore::load_or_empty(&settings.data.venues_path, &settings.data.load_options())
}

fn price_range(min: Option<f64>, max: Option<f64>) -> Option<PriceRange> {
    if min.is_none() && max.is_none() {
        return None;
    }
    let default = PriceRange::default();
    Some(PriceRange::new(min.unwrap_or(default.min), max.unwrap_or(default.max)))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
