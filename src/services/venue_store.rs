use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::Path;
use thiserror::Error;

use crate::core::filters::{matches_filter, matches_search};
use crate::models::{
    CategorySummary, District, Venue, VenueComparison, VenueFilter, VenueId, VenueStats,
};

/// Errors raised while loading or querying the venue table
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unknown venue: {0}")]
    UnknownVenue(VenueId),

    #[error("Comparison needs 2 to 5 venues, got {0}")]
    ComparisonSize(usize),
}

/// Number of fixed columns in the venue file
const COLUMN_COUNT: usize = 13;

/// Column positions of the venue file
mod col {
    pub const NAME: usize = 0;
    pub const DISTRICT: usize = 1;
    pub const PRICE_RANGE: usize = 2;
    pub const SPORT_TYPE: usize = 3;
    pub const OPENING_HOURS: usize = 4;
    pub const FACILITIES: usize = 5;
    pub const VENUE_SCALE: usize = 6;
    pub const COURSES: usize = 7;
    pub const OTHER: usize = 8;
    pub const WEBSITE: usize = 9;
    pub const ADDRESS: usize = 10;
    pub const CONTACT_PHONE: usize = 11;
    pub const PHOTOS: usize = 12;
}

/// Catch-all category for rows without a sport type
pub const MIXED_SPORT: &str = "綜合運動";

const SPORT_ALIASES: &[(&str, &str)] = &[
    ("羽球", "羽毛球"),
    ("羽毛球", "羽毛球"),
    ("游泳", "游泳"),
    ("健身", "健身"),
    ("重訓", "健身"),
    ("有氧", "有氧運動"),
    ("瑜珈", "瑜伽"),
    ("瑜伽", "瑜伽"),
    ("球類", "球類運動"),
    ("籃球", "籃球"),
    ("足球", "足球"),
    ("網球", "網球"),
    ("桌球", "桌球"),
    ("撞球", "撞球"),
    ("排球", "排球"),
    ("戶外運動", "戶外運動"),
];

const FACILITY_ALIASES: &[(&str, &str)] = &[
    ("淋浴間", "淋浴間"),
    ("置物櫃", "置物櫃"),
    ("停車場", "停車場"),
    ("Wi-Fi", "Wi-Fi"),
    ("WiFi", "Wi-Fi"),
    ("無障礙設施", "無障礙設施"),
    ("性別友善設施", "性別友善設施"),
    ("寵物友善", "寵物友善"),
    ("女性專用", "女性專用"),
];

const DEFAULT_SPORT_OPTIONS: &[&str] = &[
    "籃球", "足球", "網球", "羽毛球", "游泳", "健身", "跑步", "桌球", "排球", "棒球", "瑜伽", "舞蹈",
];

const DEFAULT_FACILITY_OPTIONS: &[&str] = &[
    "停車場", "淋浴間", "更衣室", "冷氣", "音響設備", "器材租借", "飲水機", "休息區", "無障礙設施",
    "Wi-Fi", "置物櫃", "觀眾席",
];

const COMMON_SEARCHES: &[&str] = &["室內", "戶外", "便宜", "高評分", "停車場", "24小時"];

/// Options controlling how the venue file is read
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Preamble lines before the header row
    pub skip_rows: usize,
    /// Seed for the synthetic rating and fallback price draws
    pub seed: Option<u64>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            skip_rows: 5,
            seed: None,
        }
    }
}

/// In-memory venue table
///
/// Loaded once; rows are immutable afterwards.
#[derive(Debug, Clone, Default)]
pub struct VenueStore {
    venues: Vec<Venue>,
}

impl VenueStore {
    pub fn from_venues(venues: Vec<Venue>) -> Self {
        Self { venues }
    }

    /// Load and normalize the venue file
    pub fn load<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let store = Self::from_reader(file, options)?;
        tracing::info!("Loaded {} venues from {}", store.len(), path.display());
        Ok(store)
    }

    /// Load the venue file, degrading to an empty table on any failure
    pub fn load_or_empty<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Self {
        let path = path.as_ref();
        match Self::load(path, options) {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!("Failed to load venues from {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn from_reader<R: Read>(mut reader: R, options: &LoadOptions) -> Result<Self, StoreError> {
        let mut raw = String::new();
        reader.read_to_string(&mut raw)?;
        let body = skip_lines(&raw, options.skip_rows);

        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(body.as_bytes());

        let mut rng = match options.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::seed_from_u64(rand::random()),
        };

        let mut venues = Vec::new();
        for (row, record) in csv_reader.records().enumerate() {
            let record = record?;
            if record.len() < COLUMN_COUNT {
                tracing::debug!("Row {} has {} of {} columns", row + 1, record.len(), COLUMN_COUNT);
            }
            let field = |i: usize| record.get(i).map(str::trim).unwrap_or("");

            let name = field(col::NAME);
            if name.is_empty() {
                continue;
            }

            let Some(district) = resolve_district(field(col::DISTRICT), field(col::ADDRESS)) else {
                tracing::warn!(
                    "Skipping venue '{}': district '{}' is not a Taipei district",
                    name,
                    field(col::DISTRICT)
                );
                continue;
            };
            let (latitude, longitude) = district.center();

            venues.push(Venue {
                id: (row + 1) as VenueId,
                name: name.to_string(),
                district,
                sport_type: normalize_sport_type(field(col::SPORT_TYPE)),
                price_per_hour: Some(extract_price(field(col::PRICE_RANGE), &mut rng)),
                rating: synthetic_rating(&mut rng),
                facilities: normalize_facilities(field(col::FACILITIES)),
                description: field(col::OTHER).to_string(),
                address: field(col::ADDRESS).to_string(),
                contact_phone: field(col::CONTACT_PHONE).to_string(),
                opening_hours: field(col::OPENING_HOURS).to_string(),
                website: field(col::WEBSITE).to_string(),
                venue_scale: field(col::VENUE_SCALE).to_string(),
                courses: field(col::COURSES).to_string(),
                photos: field(col::PHOTOS).to_string(),
                latitude,
                longitude,
            });
        }

        Ok(Self { venues })
    }

    pub fn all(&self) -> &[Venue] {
        &self.venues
    }

    pub fn len(&self) -> usize {
        self.venues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.venues.is_empty()
    }

    pub fn get(&self, id: VenueId) -> Option<&Venue> {
        self.venues.iter().find(|v| v.id == id)
    }

    /// Venues with the given ids, in table order
    pub fn get_many(&self, ids: &[VenueId]) -> Vec<&Venue> {
        self.venues.iter().filter(|v| ids.contains(&v.id)).collect()
    }

    /// Venues satisfying every predicate of the filter
    pub fn filter(&self, filter: &VenueFilter) -> Vec<&Venue> {
        if filter.is_empty() {
            return self.venues.iter().collect();
        }
        self.venues.iter().filter(|v| matches_filter(v, filter)).collect()
    }

    /// Keyword search; a blank query matches nothing
    pub fn search(&self, query: &str) -> Vec<&Venue> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }
        self.venues.iter().filter(|v| matches_search(v, &query)).collect()
    }

    /// Distinct sport types, sorted
    pub fn sport_types(&self) -> Vec<String> {
        if self.venues.is_empty() {
            return DEFAULT_SPORT_OPTIONS.iter().map(|s| s.to_string()).collect();
        }
        let set: BTreeSet<&str> = self.venues.iter().map(|v| v.sport_type.as_str()).collect();
        set.into_iter().map(str::to_string).collect()
    }

    /// Distinct districts, sorted by name
    pub fn districts(&self) -> Vec<String> {
        let set: BTreeSet<&str> = if self.venues.is_empty() {
            District::ALL.iter().map(|d| d.name()).collect()
        } else {
            self.venues.iter().map(|v| v.district.name()).collect()
        };
        set.into_iter().map(str::to_string).collect()
    }

    /// Distinct individual facilities, sorted
    pub fn facilities(&self) -> Vec<String> {
        if self.venues.is_empty() {
            return DEFAULT_FACILITY_OPTIONS.iter().map(|s| s.to_string()).collect();
        }
        let set: BTreeSet<&str> = self.venues.iter().flat_map(|v| v.facility_list()).collect();
        set.into_iter().map(str::to_string).collect()
    }

    pub fn stats(&self) -> VenueStats {
        if self.venues.is_empty() {
            return VenueStats {
                total_venues: 0,
                sport_types: 0,
                districts: 0,
                avg_price: 0.0,
            };
        }

        VenueStats {
            total_venues: self.venues.len(),
            sport_types: self.sport_types().len(),
            districts: self.districts().len(),
            avg_price: mean(self.venues.iter().filter_map(|v| v.price_per_hour.map(f64::from)))
                .unwrap_or(0.0),
        }
    }

    /// Count, mean price and mean rating per sport type
    pub fn sport_summary(&self) -> Vec<CategorySummary> {
        self.summarize_by(|v| v.sport_type.clone())
    }

    /// Count, mean price and mean rating per district
    pub fn district_summary(&self) -> Vec<CategorySummary> {
        self.summarize_by(|v| v.district.name().to_string())
    }

    fn summarize_by<F>(&self, key: F) -> Vec<CategorySummary>
    where
        F: Fn(&Venue) -> String,
    {
        let mut groups: BTreeMap<String, Vec<&Venue>> = BTreeMap::new();
        for venue in &self.venues {
            groups.entry(key(venue)).or_default().push(venue);
        }

        let mut summaries: Vec<CategorySummary> = groups
            .into_iter()
            .map(|(category, members)| CategorySummary {
                count: members.len(),
                avg_price: mean(members.iter().filter_map(|v| v.price_per_hour.map(f64::from))),
                avg_rating: mean(members.iter().map(|v| v.rating)).unwrap_or(0.0),
                category,
            })
            .collect();

        // Stable sort keeps name order among equal counts
        summaries.sort_by(|a, b| b.count.cmp(&a.count));
        summaries
    }

    /// Suggested search keywords
    pub fn popular_searches(&self) -> Vec<String> {
        let sports = self.sport_types();
        let districts = self.districts();

        sports
            .into_iter()
            .take(5)
            .chain(districts.into_iter().take(3))
            .chain(COMMON_SEARCHES.iter().map(|s| s.to_string()))
            .take(10)
            .collect()
    }

    /// Compare 2 to 5 venues side by side
    pub fn compare(&self, ids: &[VenueId]) -> Result<VenueComparison, StoreError> {
        if !(2..=5).contains(&ids.len()) {
            return Err(StoreError::ComparisonSize(ids.len()));
        }

        let venues = ids
            .iter()
            .map(|&id| self.get(id).cloned().ok_or(StoreError::UnknownVenue(id)))
            .collect::<Result<Vec<_>, _>>()?;

        let cheapest = venues
            .iter()
            .filter_map(|v| v.price_per_hour.map(|p| (v.id, p)))
            .min_by_key(|&(_, p)| p)
            .map(|(id, _)| id);

        let best_rated = venues
            .iter()
            .max_by(|a, b| a.rating.partial_cmp(&b.rating).unwrap_or(std::cmp::Ordering::Equal))
            .map(|v| v.id);

        let mut facilities: BTreeMap<String, Vec<VenueId>> = BTreeMap::new();
        for venue in &venues {
            for facility in venue.facility_list() {
                let holders = facilities.entry(facility.to_string()).or_default();
                if !holders.contains(&venue.id) {
                    holders.push(venue.id);
                }
            }
        }

        Ok(VenueComparison {
            venues,
            cheapest,
            best_rated,
            facilities: facilities.into_iter().collect(),
        })
    }
}

fn skip_lines(raw: &str, count: usize) -> &str {
    let mut rest = raw;
    for _ in 0..count {
        match rest.find('\n') {
            Some(pos) => rest = &rest[pos + 1..],
            None => return "",
        }
    }
    rest
}

fn mean<I: Iterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Resolve the district from the district column, falling back to the address
pub fn resolve_district(district_field: &str, address: &str) -> Option<District> {
    let normalize = |s: &str| s.replace('台', "臺");
    District::find_in(&normalize(district_field)).or_else(|| District::find_in(&normalize(address)))
}

/// Map free-text sport descriptions onto the category list
pub fn normalize_sport_type(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return MIXED_SPORT.to_string();
    }

    SPORT_ALIASES
        .iter()
        .find(|(alias, _)| raw.contains(alias))
        .map(|(_, category)| category.to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Hourly price from the price-bucket column
pub fn extract_price<R: Rng>(raw: &str, rng: &mut R) -> u32 {
    let raw = raw.trim();
    if raw.is_empty() {
        return rng.gen_range(100..=500);
    }

    if raw.contains("0-200") {
        150
    } else if raw.contains("200-500") {
        350
    } else if raw.contains("500以上") {
        700
    } else {
        rng.gen_range(200..=400)
    }
}

/// Known facilities found in the text, `/`-joined
pub fn normalize_facilities(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return "基本設施".to_string();
    }

    let mut found: Vec<&str> = Vec::new();
    for (alias, name) in FACILITY_ALIASES {
        if raw.contains(alias) && !found.contains(name) {
            found.push(name);
        }
    }

    if found.is_empty() {
        raw.to_string()
    } else {
        found.join("/")
    }
}

/// Placeholder rating in [3.5, 5.0], one decimal
///
/// The source data has no ratings; this is not a measurement.
pub fn synthetic_rating<R: Rng>(rng: &mut R) -> f64 {
    (rng.gen_range(3.5..=5.0_f64) * 10.0).round() / 10.0
}
