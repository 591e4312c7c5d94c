use chrono::{DateTime, Timelike};
use favcast_core::RequestError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Which provider resource a request is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherKind {
    Current,
    Forecast,
}

impl WeatherKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Forecast => "forecast",
        }
    }
}

impl fmt::Display for WeatherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Build coordinates, rejecting non-finite or out-of-range values.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, RequestError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(RequestError::OutOfRange {
                param: "lat",
                value: latitude,
            });
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(RequestError::OutOfRange {
                param: "lon",
                value: longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Parse the textual `lat`/`lon` query values.
    pub fn parse(lat: &str, lon: &str) -> Result<Self, RequestError> {
        let latitude = parse_component("lat", lat)?;
        let longitude = parse_component("lon", lon)?;
        Self::new(latitude, longitude)
    }
}

fn parse_component(param: &'static str, raw: &str) -> Result<f64, RequestError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| RequestError::NotANumber {
            param,
            value: raw.to_string(),
        })
}

/// One weather condition as reported by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherCondition {
    pub id: i64,
    pub main: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

/// Temperature, pressure and humidity readings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Readings {
    pub temp: f64,
    pub feels_like: f64,
    pub pressure: f64,
    pub humidity: f64,
}

/// Wind vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed: f64,
    pub deg: f64,
}

impl Wind {
    /// 16-point compass direction the wind blows from
    pub fn cardinal(&self) -> &'static str {
        degrees_to_cardinal(self.deg)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Clouds {
    pub all: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SunInfo {
    #[serde(default)]
    pub country: Option<String>,
    pub sunrise: i64,
    pub sunset: i64,
}

/// Current conditions for one location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub coord: GeoPoint,
    pub weather: Vec<WeatherCondition>,
    #[serde(default)]
    pub base: String,
    pub main: Readings,
    pub wind: Wind,
    #[serde(default)]
    pub clouds: Clouds,
    pub dt: i64,
    pub sys: SunInfo,
    /// Shift in seconds from UTC
    pub timezone: i32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub cod: i64,
}

impl WeatherSnapshot {
    pub fn primary_condition(&self) -> Option<&WeatherCondition> {
        self.weather.first()
    }

    /// Sunrise as wall-clock time at the location, e.g. "6:04 AM"
    pub fn sunrise_local(&self) -> Option<String> {
        format_local_time(self.sys.sunrise, self.timezone)
    }

    pub fn sunset_local(&self) -> Option<String> {
        format_local_time(self.sys.sunset, self.timezone)
    }
}

/// One timestamped sample of a forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    pub dt: i64,
    pub main: Readings,
    pub weather: Vec<WeatherCondition>,
    pub wind: Wind,
    #[serde(default)]
    pub dt_txt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityInfo {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    pub coord: GeoPoint,
    #[serde(default)]
    pub country: String,
    pub timezone: i32,
    #[serde(default)]
    pub sunrise: i64,
    #[serde(default)]
    pub sunset: i64,
}

/// Ordered forecast samples for one location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    #[serde(default)]
    pub cod: String,
    #[serde(default)]
    pub message: f64,
    pub cnt: u32,
    pub list: Vec<ForecastSample>,
    pub city: CityInfo,
}

/// A decoded provider response as held by the cache.
///
/// Payloads sit behind `Arc` so one upstream result can be handed to every
/// waiting caller without deep copies.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherPayload {
    Current(Arc<WeatherSnapshot>),
    Forecast(Arc<ForecastSeries>),
}

impl WeatherPayload {
    pub fn kind(&self) -> WeatherKind {
        match self {
            Self::Current(_) => WeatherKind::Current,
            Self::Forecast(_) => WeatherKind::Forecast,
        }
    }

    /// JSON body in the provider's own shape
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            Self::Current(snapshot) => serde_json::to_value(snapshot.as_ref()),
            Self::Forecast(series) => serde_json::to_value(series.as_ref()),
        }
    }
}

/// Map a bearing in degrees onto a 16-point compass direction
pub fn degrees_to_cardinal(degrees: f64) -> &'static str {
    const DIRECTIONS: [&str; 16] = [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
        "NW", "NNW",
    ];
    let index = ((degrees / 22.5).round() as i64).rem_euclid(16) as usize;
    DIRECTIONS[index]
}

/// Format a unix timestamp as "h:mm AM/PM" at the given UTC offset
pub fn format_local_time(unix: i64, offset_secs: i32) -> Option<String> {
    let local = DateTime::from_timestamp(unix.checked_add(i64::from(offset_secs))?, 0)?;
    let (is_pm, hour) = local.hour12();
    Some(format!(
        "{}:{:02} {}",
        hour,
        local.minute(),
        if is_pm { "PM" } else { "AM" }
    ))
}
