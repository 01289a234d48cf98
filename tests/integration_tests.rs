// Integration tests for the venue finder

use std::io::Write;

use venue_finder::config::Settings;
use venue_finder::core::geo::{cluster_by_proximity, venues_in_radius};
use venue_finder::models::{
    District, PriceRange, RecommendRequest, Strategy, UserPreferences, VenueFilter,
};
use venue_finder::{LoadOptions, Recommender, VenueStore, WeatherService};

const VENUES_CSV: &str = "\
臺北市運動場地資訊
資料來源：各區運動中心
更新日期：2025-09-01
,,,,,,,,,,,,
,,,,,,,,,,,,
場地名稱,行政區,價格,運動類型,開放時間,設施,規模,課程,其他,網站,地址,電話,照片
大安森林籃球場,大安區,0-200,籃球,24小時,停車場,小型,,戶外球場,,臺北市大安區新生南路二段1號,,
信義運動中心,信義區,200-500,游泳,06:00-22:00,淋浴間、置物櫃,大型,游泳班,溫水泳池,,臺北市信義區松勤街100號,02-2723-2345,
中正運動中心,中正區,200-500,羽球,06:00-22:00,淋浴間、無障礙設施,大型,羽球班,,,臺北市中正區信義路一段1號,,
青年公園籃球場,萬華區,0-200,籃球,05:00-23:00,停車場,小型,,夜間照明,,臺北市萬華區水源路199號,,
天母網球場,士林區,500以上,網球,06:00-22:00,停車場,中型,網球班,,,臺北市士林區忠誠路二段77號,,
北投運動中心,北投區,200-500,游泳,06:00-22:00,淋浴間、停車場,大型,,溫泉區旁,,臺北市北投區石牌路一段39巷100號,,
內湖運動中心,內湖區,200-500,健身,06:00-22:00,淋浴間、置物櫃,大型,,重訓室,,臺北市內湖區洲子街12號,,
迎風河濱公園,,,,,,,,自行車道與慢跑步道,,台北市松山區健康路,,
新莊體育館,新北市新莊區,200-500,籃球,,,,,,,新北市新莊區中華路一段75號,,
";

fn load_fixture() -> VenueStore {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(VENUES_CSV.as_bytes()).unwrap();

    let options = LoadOptions {
        skip_rows: 5,
        seed: Some(42),
    };
    VenueStore::load(file.path(), &options).unwrap()
}

fn basketball_in_daan() -> UserPreferences {
    let mut prefs = UserPreferences::default();
    prefs.preferred_sports.insert("籃球".to_string());
    prefs.preferred_districts.insert(District::Daan);
    prefs.price_range = PriceRange::new(0.0, 500.0);
    prefs
}

#[test]
fn test_load_resolves_districts_and_coordinates() {
    let store = load_fixture();

    // The New Taipei row is dropped
    assert_eq!(store.len(), 8);

    let riverside = store.search("迎風").into_iter().next().unwrap();
    assert_eq!(riverside.district, District::Songshan);
    assert_eq!(riverside.sport_type, "綜合運動");
    assert_eq!((riverside.latitude, riverside.longitude), District::Songshan.center());

    let badminton = store.search("中正運動中心")[0];
    assert_eq!(badminton.sport_type, "羽毛球");
    assert_eq!(badminton.price_per_hour, Some(350));
    assert_eq!(badminton.facilities, "淋浴間/無障礙設施");

    for venue in store.all() {
        assert!((3.5..=5.0).contains(&venue.rating));
    }
}

#[test]
fn test_seeded_load_is_reproducible() {
    let a = load_fixture();
    let b = load_fixture();
    let ratings = |s: &VenueStore| s.all().iter().map(|v| v.rating).collect::<Vec<_>>();
    assert_eq!(ratings(&a), ratings(&b));
}

#[test]
fn test_missing_file_degrades_to_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = VenueStore::load_or_empty(dir.path().join("missing.csv"), &LoadOptions::default());
    assert!(store.is_empty());
    assert_eq!(store.stats().total_venues, 0);
    assert!(!store.sport_types().is_empty());
}

#[test]
fn test_filter_and_search() {
    let store = load_fixture();

    assert_eq!(store.filter(&VenueFilter::default()).len(), store.len());

    let cheap_basketball = VenueFilter {
        sport_types: vec!["籃球".to_string()],
        price_range: Some(PriceRange::new(0.0, 200.0)),
        ..Default::default()
    };
    let hits = store.filter(&cheap_basketball);
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|v| v.price_per_hour == Some(150)));

    assert_eq!(store.search("泳池").len(), 1);
    assert!(store.search("   ").is_empty());
}

#[test]
fn test_personalized_prefers_matching_venue() {
    let store = load_fixture();
    let recommender = Recommender::with_default_weights();
    let request = RecommendRequest::new(Strategy::Personalized, basketball_in_daan());

    let response = recommender.recommend(&store, &request).unwrap();
    assert_eq!(response.total_candidates, 8);
    assert_eq!(response.results[0].venue.name, "大安森林籃球場");

    let swimming = response
        .results
        .iter()
        .position(|r| r.venue.name == "信義運動中心")
        .unwrap();
    assert!(swimming > 0);

    for pair in response.results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[test]
fn test_every_strategy_respects_limit_and_bounds() {
    let store = load_fixture();
    let recommender = Recommender::with_default_weights().with_peer_seed(7);

    let strategies = [
        Strategy::Personalized,
        Strategy::Trending,
        Strategy::NewVenues,
        Strategy::Collaborative,
        Strategy::RatingBased,
        Strategy::ClusterBased,
        Strategy::ContentBased,
        Strategy::MlBased,
    ];

    for strategy in strategies {
        let mut request = RecommendRequest::new(strategy, basketball_in_daan());
        request.limit = 3;

        let response = recommender.recommend(&store, &request).unwrap();
        assert!(response.results.len() <= 3, "{} exceeded limit", strategy);
        for result in &response.results {
            assert!(
                (0.0..=10.0).contains(&result.score),
                "{} score {} out of range",
                strategy,
                result.score
            );
        }
    }
}

#[test]
fn test_rating_based_keeps_rating_order() {
    let store = load_fixture();
    let results = Recommender::with_default_weights()
        .rating_based(&store, &UserPreferences::default(), 8)
        .unwrap();

    for pair in results.windows(2) {
        assert!(pair[0].venue.rating >= pair[1].venue.rating);
    }
}

#[test]
fn test_empty_store_yields_no_results() {
    let store = VenueStore::default();
    let recommender = Recommender::with_default_weights();

    for strategy in [Strategy::Personalized, Strategy::ClusterBased, Strategy::MlBased] {
        let request = RecommendRequest::new(strategy, basketball_in_daan());
        let response = recommender.recommend(&store, &request).unwrap();
        assert!(response.results.is_empty());
        assert_eq!(response.total_candidates, 0);
    }
}

#[test]
fn test_invalid_request_is_rejected() {
    let store = load_fixture();
    let mut prefs = basketball_in_daan();
    prefs.price_range = PriceRange::new(800.0, 100.0);

    let request = RecommendRequest::new(Strategy::Personalized, prefs);
    assert!(Recommender::with_default_weights().recommend(&store, &request).is_err());
}

#[test]
fn test_geo_queries_on_loaded_store() {
    let store = load_fixture();
    let (lat, lon) = District::Daan.center();

    let nearby = venues_in_radius(store.all(), lat, lon, 0.1);
    assert_eq!(nearby.len(), 1);
    assert_eq!(nearby[0].venue.district, District::Daan);

    // Every district sits kilometres apart
    let clusters = cluster_by_proximity(store.all(), 0.5);
    assert_eq!(clusters.len(), store.len());
}

#[test]
fn test_compare_venues() {
    let store = load_fixture();
    let ids: Vec<_> = store.all().iter().take(3).map(|v| v.id).collect();

    let comparison = store.compare(&ids).unwrap();
    assert_eq!(comparison.venues.len(), 3);
    assert_eq!(comparison.cheapest, Some(ids[0]));

    assert!(store.compare(&ids[..1]).is_err());
    assert!(store.compare(&[ids[0], 999]).is_err());
}

#[test]
fn test_weather_file_round_trip() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"records": {{"Locations": [{{"LocationsName": "臺北市", "Location": [
            {{"LocationName": "信義區", "WeatherElement": [
                {{"ElementName": "溫度", "Time": [
                    {{"DataTime": "2025-09-15T09:00:00+08:00", "ElementValue": [{{"Temperature": "27"}}]}},
                    {{"DataTime": "2025-09-15T12:00:00+08:00", "ElementValue": [{{"Temperature": "30"}}]}}
                ]}}
            ]}}
        ]}}]}}}}"#
    )
    .unwrap();

    let weather = WeatherService::load(file.path()).unwrap();
    assert_eq!(weather.available_districts(), vec!["信義區"]);

    let missing = WeatherService::load_or_empty(file.path().with_extension("absent"));
    assert!(missing.available_districts().is_empty());
}

#[test]
fn test_settings_file_overrides_defaults() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "[recommendation]\ndefault_limit = 4\n\n[logging]\nlevel = \"debug\"").unwrap();

    let settings = Settings::load_from(file.path()).unwrap();
    assert_eq!(settings.recommendation.default_limit, 4);
    assert_eq!(settings.recommendation.diversity_weight, 0.3);
    assert_eq!(settings.logging.level, "debug");
    assert_eq!(settings.data.skip_rows, 5);
}
