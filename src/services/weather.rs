use chrono::{DateTime, Local, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::models::{CurrentWeather, HourlyForecast};

/// Errors that can occur while loading the forecast payload
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// City name used by the forecast payload
const CITY_LOCATIONS_NAME: &str = "臺北市";

/// Forecast element names and the value key each one carries
mod element {
    pub const TEMPERATURE: (&str, &str) = ("溫度", "Temperature");
    pub const APPARENT_TEMPERATURE: (&str, &str) = ("體感溫度", "ApparentTemperature");
    pub const HUMIDITY: (&str, &str) = ("相對濕度", "RelativeHumidity");
    pub const WIND_DIRECTION: (&str, &str) = ("風向", "WindDirection");
    pub const WIND_SPEED: (&str, &str) = ("風速", "BeaufortScale");
    pub const PRECIPITATION: (&str, &str) = ("3小時降雨機率", "ProbabilityOfPrecipitation");
    pub const DESCRIPTION: (&str, &str) = ("天氣現象", "Weather");
    pub const COMFORT: (&str, &str) = ("舒適度指數", "ComfortIndexDescription");
}

const COMPASS_POINTS: [&str; 16] = [
    "北風", "北北東風", "東北風", "東北東風",
    "東風", "東南東風", "東南風", "南南東風",
    "南風", "南南西風", "西南風", "西南西風",
    "西風", "西北西風", "西北風", "北北西風",
];

#[derive(Debug, Default, Deserialize)]
struct Payload {
    #[serde(default)]
    records: Records,
}

#[derive(Debug, Default, Deserialize)]
struct Records {
    #[serde(rename = "Locations", default)]
    locations: Vec<LocationGroup>,
}

#[derive(Debug, Deserialize)]
struct LocationGroup {
    #[serde(rename = "LocationsName", default)]
    name: String,
    #[serde(rename = "Location", default)]
    locations: Vec<RawLocation>,
}

#[derive(Debug, Deserialize)]
struct RawLocation {
    #[serde(rename = "LocationName", default)]
    name: String,
    #[serde(rename = "Geocode", default)]
    geocode: Option<Value>,
    #[serde(rename = "Latitude", default)]
    latitude: Option<Value>,
    #[serde(rename = "Longitude", default)]
    longitude: Option<Value>,
    #[serde(rename = "WeatherElement", default)]
    elements: Vec<RawElement>,
}

#[derive(Debug, Deserialize)]
struct RawElement {
    #[serde(rename = "ElementName", default)]
    name: String,
    #[serde(rename = "Time", default)]
    series: Vec<TimeEntry>,
}

/// One point of a forecast time series
#[derive(Debug, Clone, Deserialize)]
pub struct TimeEntry {
    #[serde(rename = "DataTime", default)]
    pub data_time: Option<String>,
    #[serde(rename = "StartTime", default)]
    pub start_time: Option<String>,
    #[serde(rename = "ElementValue", default)]
    pub values: Vec<serde_json::Map<String, Value>>,
}

impl TimeEntry {
    /// Timestamp as local wall-clock time of the payload
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        self.data_time
            .as_deref()
            .or(self.start_time.as_deref())
            .and_then(parse_timestamp)
    }

    /// First element value under `key`, numbers rendered as text
    pub fn value(&self, key: &str) -> Option<String> {
        self.values.first()?.get(key).and_then(value_as_string)
    }
}

/// Parsed forecast for one district
#[derive(Debug, Clone)]
pub struct DistrictWeather {
    pub name: String,
    pub geocode: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub elements: HashMap<String, Vec<TimeEntry>>,
}

/// Per-district forecast lookup over a static payload
#[derive(Debug, Clone, Default)]
pub struct WeatherService {
    districts: Vec<DistrictWeather>,
}

impl WeatherService {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, WeatherError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let service = Self::from_json(&text)?;
        tracing::info!(
            "Loaded weather for {} districts from {}",
            service.districts.len(),
            path.display()
        );
        Ok(service)
    }

    /// Load the payload, degrading to defaults-only lookups on failure
    pub fn load_or_empty<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(service) => service,
            Err(e) => {
                tracing::warn!("Failed to load weather data from {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn from_json(text: &str) -> Result<Self, WeatherError> {
        let payload: Payload = serde_json::from_str(text)?;

        let districts = payload
            .records
            .locations
            .into_iter()
            .filter(|group| group.name == CITY_LOCATIONS_NAME)
            .flat_map(|group| group.locations)
            .map(|location| DistrictWeather {
                name: location.name,
                geocode: location.geocode.as_ref().and_then(value_as_string),
                latitude: location.latitude.as_ref().and_then(value_as_f64),
                longitude: location.longitude.as_ref().and_then(value_as_f64),
                elements: location
                    .elements
                    .into_iter()
                    .map(|e| (e.name, e.series))
                    .collect(),
            })
            .collect();

        Ok(Self { districts })
    }

    /// District names in payload order
    pub fn available_districts(&self) -> Vec<&str> {
        self.districts.iter().map(|d| d.name.as_str()).collect()
    }

    pub fn district(&self, name: &str) -> Option<&DistrictWeather> {
        self.districts.iter().find(|d| d.name == name)
    }

    pub fn current_weather(&self, district: &str) -> CurrentWeather {
        self.current_weather_at(district, Local::now().naive_local())
    }

    /// Conditions closest to `now`
    ///
    /// Unknown districts fall back to the first district in the payload;
    /// with no payload at all the default conditions are returned.
    pub fn current_weather_at(&self, district: &str, now: NaiveDateTime) -> CurrentWeather {
        let Some(data) = self.district(district).or_else(|| self.districts.first()) else {
            return default_weather(now);
        };

        let reading = |(element, key): (&str, &str)| -> Option<String> {
            let series = data.elements.get(element)?;
            closest_entry(series, now)?.value(key).filter(|v| !v.is_empty())
        };
        let number = |field: (&str, &str)| -> Option<i32> {
            reading(field).and_then(|v| v.trim().parse::<f64>().ok()).map(|v| v as i32)
        };

        let mut weather = default_weather(now);
        weather.district = data.name.clone();

        if let Some(v) = number(element::TEMPERATURE) {
            weather.temperature = v;
        }
        if let Some(v) = number(element::APPARENT_TEMPERATURE) {
            weather.apparent_temperature = v;
        }
        if let Some(v) = number(element::HUMIDITY) {
            weather.humidity = v;
        }
        if let Some(v) = reading(element::WIND_DIRECTION) {
            weather.wind_direction = wind_direction_label(&v);
        }
        if let Some(v) = number(element::WIND_SPEED) {
            weather.wind_speed = v;
        }
        if let Some(v) = number(element::PRECIPITATION) {
            weather.precipitation_probability = v;
        }
        if let Some(v) = reading(element::DESCRIPTION) {
            weather.weather_description = v;
        }
        if let Some(v) = reading(element::COMFORT) {
            weather.comfort_index = v;
        }

        weather
    }

    /// First `hours` temperature readings of a district; empty for unknown
    /// districts
    pub fn hourly_forecast(&self, district: &str, hours: usize) -> Vec<HourlyForecast> {
        let Some(series) = self
            .district(district)
            .and_then(|d| d.elements.get(element::TEMPERATURE.0))
        else {
            return Vec::new();
        };

        series
            .iter()
            .take(hours)
            .filter_map(|entry| {
                let time = entry.timestamp()?;
                let temperature = entry
                    .value(element::TEMPERATURE.1)
                    .unwrap_or_else(|| "25".to_string())
                    .trim()
                    .parse::<i32>()
                    .ok()?;
                Some(HourlyForecast {
                    time: time.format("%H:%M").to_string(),
                    date: time.format("%m/%d").to_string(),
                    temperature,
                    hour: chrono::Timelike::hour(&time),
                })
            })
            .collect()
    }
}

/// Entry whose timestamp is nearest to `now`; earliest wins ties
pub fn closest_entry(series: &[TimeEntry], now: NaiveDateTime) -> Option<&TimeEntry> {
    let mut best: Option<(&TimeEntry, i64)> = None;
    for entry in series {
        let Some(time) = entry.timestamp() else {
            continue;
        };
        let diff = (now - time).num_seconds().abs();
        if best.map_or(true, |(_, d)| diff < d) {
            best = Some((entry, diff));
        }
    }
    best.map(|(entry, _)| entry)
}

/// Compass label for a wind direction in degrees
///
/// Non-numeric input passes through unchanged; empty input reads as calm.
pub fn wind_direction_label(raw: &str) -> String {
    match raw.trim().parse::<f64>() {
        Ok(degrees) => {
            let index = ((degrees + 11.25) / 22.5).floor().rem_euclid(16.0) as usize;
            COMPASS_POINTS[index % 16].to_string()
        }
        Err(_) if raw.trim().is_empty() => "微風".to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Emoji for a weather description, using temperature when the text is
/// inconclusive
pub fn weather_icon(description: &str, temperature: i32) -> &'static str {
    let desc = description.to_lowercase();

    if desc.contains('晴') || desc.contains('陽') {
        "☀️"
    } else if desc.contains('雲') || desc.contains('陰') {
        if desc.contains("多雲") {
            "⛅"
        } else {
            "☁️"
        }
    } else if desc.contains('雨') {
        if desc.contains("小雨") {
            "🌦️"
        } else {
            "🌧️"
        }
    } else if desc.contains('雷') {
        "⛈️"
    } else if desc.contains('雪') {
        "❄️"
    } else if desc.contains('霧') {
        "🌫️"
    } else if temperature >= 30 {
        "☀️"
    } else if temperature >= 25 {
        "⛅"
    } else {
        "☁️"
    }
}

/// Outdoor exercise advice; rain outranks heat, heat outranks cold,
/// cold outranks humidity
pub fn exercise_advice(temperature: i32, humidity: i32, precipitation: i32) -> &'static str {
    if precipitation > 60 {
        "🌧️ 今日有雨，建議室內運動"
    } else if temperature > 35 {
        "🌡️ 高溫警告，請注意防曬補水"
    } else if temperature < 15 {
        "🧥 氣溫較低，請注意保暖"
    } else if humidity > 80 {
        "💦 濕度較高，運動時多補水"
    } else {
        "☀️ 今日適合戶外運動"
    }
}

fn default_weather(now: NaiveDateTime) -> CurrentWeather {
    CurrentWeather {
        district: "台北市".to_string(),
        temperature: 25,
        apparent_temperature: 27,
        humidity: 65,
        wind_direction: "東北風".to_string(),
        wind_speed: 3,
        precipitation_probability: 10,
        weather_description: "晴朗".to_string(),
        comfort_index: "舒適".to_string(),
        update_time: now.format("%H:%M").to_string(),
    }
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_local())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .ok()
}

fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
