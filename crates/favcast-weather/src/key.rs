//! Cache key derivation.
//!
//! Coordinates are rounded to a fixed number of decimals before they are
//! formatted, so floating-point noise (`51.5074` vs `51.50740000001`) never
//! splits one physical location across several cache entries.

use crate::types::{Coordinates, WeatherKind};
use std::fmt;

/// Decimal places used when no precision is configured (about 11 m)
pub const DEFAULT_PRECISION: u32 = 4;

/// Finest supported precision; beyond this f64 noise leaks into the key
pub const MAX_PRECISION: u32 = 8;

/// Opaque cache key, e.g. `current:51.5074,-0.1278`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyNormalizer {
    precision: u32,
}

impl Default for KeyNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_PRECISION)
    }
}

impl KeyNormalizer {
    /// Precision above `MAX_PRECISION` is clamped to it.
    pub fn new(precision: u32) -> Self {
        Self {
            precision: precision.min(MAX_PRECISION),
        }
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Derive the key for one kind of data at one location.
    pub fn key(&self, kind: WeatherKind, coords: Coordinates) -> CacheKey {
        let rounded = self.round(coords);
        let places = self.precision as usize;
        CacheKey(format!(
            "{}:{:.*},{:.*}",
            kind.as_str(),
            places,
            rounded.latitude,
            places,
            rounded.longitude
        ))
    }

    /// Coordinates at key precision; this is what gets sent upstream.
    pub fn round(&self, coords: Coordinates) -> Coordinates {
        Coordinates {
            latitude: round_to(coords.latitude, self.precision),
            longitude: round_to(coords.longitude, self.precision),
        }
    }
}

/// Derive a key at the default precision.
pub fn normalize(kind: WeatherKind, coords: Coordinates) -> CacheKey {
    KeyNormalizer::default().key(kind, coords)
}

fn round_to(value: f64, precision: u32) -> f64 {
    let scale = 10f64.powi(precision as i32);
    let rounded = (value * scale).round() / scale;
    // -0.0 prints as "-0.0000"; fold it so both sides of the meridian key alike
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(lat: f64, lon: f64) -> Coordinates {
        Coordinates::new(lat, lon).unwrap()
    }

    #[test]
    fn test_key_format() {
        let key = normalize(WeatherKind::Current, coords(51.5074, -0.1278));
        assert_eq!(key.as_str(), "current:51.5074,-0.1278");

        let key = normalize(WeatherKind::Forecast, coords(40.0, -74.5));
        assert_eq!(key.to_string(), "forecast:40.0000,-74.5000");
    }

    #[test]
    fn test_noise_beyond_precision_maps_to_same_key() {
        let a = normalize(WeatherKind::Current, coords(51.5074, -0.1278));
        let b = normalize(WeatherKind::Current, coords(51.50740000001, -0.12779999999));
        let c = normalize(WeatherKind::Current, coords(51.507404, -0.127801));
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_distinct_locations_get_distinct_keys() {
        let a = normalize(WeatherKind::Current, coords(51.5074, -0.1278));
        let b = normalize(WeatherKind::Current, coords(51.5075, -0.1278));
        assert_ne!(a, b);
    }

    #[test]
    fn test_kind_is_part_of_key() {
        let location = coords(48.8566, 2.3522);
        assert_ne!(
            normalize(WeatherKind::Current, location),
            normalize(WeatherKind::Forecast, location)
        );
    }

    #[test]
    fn test_negative_zero_folds_to_zero() {
        let a = normalize(WeatherKind::Current, coords(0.00001, -0.00001));
        let b = normalize(WeatherKind::Current, coords(-0.00001, 0.00001));
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "current:0.0000,0.0000");
    }

    #[test]
    fn test_custom_precision() {
        let normalizer = KeyNormalizer::new(2);
        let a = normalizer.key(WeatherKind::Forecast, coords(51.5074, -0.1278));
        let b = normalizer.key(WeatherKind::Forecast, coords(51.5112, -0.1301));
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "forecast:51.51,-0.13");
    }

    #[test]
    fn test_excessive_precision_is_clamped() {
        for precision in [9, 400, u32::MAX] {
            let normalizer = KeyNormalizer::new(precision);
            assert_eq!(normalizer.precision(), MAX_PRECISION);

            let key = normalizer.key(WeatherKind::Current, coords(51.5074, -0.1278));
            assert_eq!(key.as_str(), "current:51.50740000,-0.12780000");
        }
    }

    #[test]
    fn test_round_returns_key_precision_coordinates() {
        let rounded = KeyNormalizer::default().round(coords(51.50740000001, -0.12779999999));
        assert_eq!(rounded.latitude, 51.5074);
        assert_eq!(rounded.longitude, -0.1278);
    }

    #[test]
    fn test_range_bounds_are_stable() {
        let a = normalize(WeatherKind::Current, coords(90.0, -180.0));
        let b = normalize(WeatherKind::Current, coords(89.999999, -179.999999));
        assert_eq!(a, b);
    }
}
