// Criterion benchmarks for the venue finder

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use venue_finder::core::{
    distance::{calculate_bounding_box, haversine_distance},
    geo::{cluster_by_proximity, venues_in_radius},
};
use venue_finder::models::{District, PriceRange, UserPreferences, Venue, VenueFilter};
use venue_finder::{Recommender, VenueStore};

const SPORTS: [&str; 6] = ["籃球", "游泳", "羽毛球", "網球", "健身", "桌球"];

fn create_venue(id: usize) -> Venue {
    let district = District::ALL[id % District::ALL.len()];
    let (lat, lon) = district.center();
    let jitter = (id as f64 * 0.0007) % 0.02;

    Venue {
        id: id as u32 + 1,
        name: format!("{}運動場 {}", district, id),
        district,
        sport_type: SPORTS[id % SPORTS.len()].to_string(),
        price_per_hour: Some(100 + (id % 7) as u32 * 100),
        rating: 3.5 + (id % 16) as f64 * 0.1,
        facilities: if id % 2 == 0 { "淋浴間/停車場" } else { "置物櫃" }.to_string(),
        description: "室內場地 夜間開放".to_string(),
        address: format!("臺北市{}", district),
        contact_phone: String::new(),
        opening_hours: "06:00-22:00".to_string(),
        website: String::new(),
        venue_scale: String::new(),
        courses: String::new(),
        photos: String::new(),
        latitude: lat + jitter,
        longitude: lon - jitter,
    }
}

fn create_store(count: usize) -> VenueStore {
    VenueStore::from_venues((0..count).map(create_venue).collect())
}

fn create_preferences() -> UserPreferences {
    let mut prefs = UserPreferences::default();
    prefs.preferred_sports.insert("籃球".to_string());
    prefs.preferred_districts.insert(District::Daan);
    prefs.price_range = PriceRange::new(0.0, 500.0);
    prefs
}

fn bench_haversine_distance(c: &mut Criterion) {
    c.bench_function("haversine_distance", |b| {
        b.iter(|| {
            haversine_distance(
                black_box(25.0330),
                black_box(121.5654),
                black_box(25.0478),
                black_box(121.5170),
            )
        });
    });
}

fn bench_bounding_box(c: &mut Criterion) {
    c.bench_function("bounding_box_calculation", |b| {
        b.iter(|| calculate_bounding_box(black_box(25.0330), black_box(121.5654), black_box(5.0)));
    });
}

fn bench_filtering(c: &mut Criterion) {
    let store = create_store(500);
    let filter = VenueFilter {
        sport_types: vec!["籃球".to_string(), "游泳".to_string()],
        price_range: Some(PriceRange::new(0.0, 400.0)),
        facilities: vec!["停車場".to_string()],
        min_rating: 4.0,
        ..Default::default()
    };

    c.bench_function("filter_500_venues", |b| {
        b.iter(|| black_box(store.filter(black_box(&filter))).len());
    });
}

fn bench_geo(c: &mut Criterion) {
    let store = create_store(500);
    let (lat, lon) = District::Daan.center();

    c.bench_function("venues_in_radius_500", |b| {
        b.iter(|| venues_in_radius(store.all(), black_box(lat), black_box(lon), black_box(2.0)).len());
    });
    c.bench_function("cluster_by_proximity_500", |b| {
        b.iter(|| cluster_by_proximity(store.all(), black_box(0.5)).len());
    });
}

fn bench_strategies(c: &mut Criterion) {
    let recommender = Recommender::with_default_weights().with_peer_seed(7);
    let preferences = create_preferences();

    let mut group = c.benchmark_group("recommend");

    for venue_count in [50, 200, 500].iter() {
        let store = create_store(*venue_count);

        group.bench_with_input(
            BenchmarkId::new("personalized", venue_count),
            venue_count,
            |b, _| {
                b.iter(|| recommender.personalized(&store, black_box(&preferences), 10, 0.3));
            },
        );
        group.bench_with_input(
            BenchmarkId::new("content_based", venue_count),
            venue_count,
            |b, _| {
                b.iter(|| recommender.content_based(&store, black_box(&preferences), 10));
            },
        );
        group.bench_with_input(
            BenchmarkId::new("cluster_based", venue_count),
            venue_count,
            |b, _| {
                b.iter(|| recommender.cluster_based(&store, black_box(&preferences), 10));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_haversine_distance,
    bench_bounding_box,
    bench_filtering,
    bench_geo,
    bench_strategies
);

criterion_main!(benches);
