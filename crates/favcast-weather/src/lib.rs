//! Fetch-through weather cache for favcast
//!
//! Serves OpenWeather current conditions and forecasts per favourite
//! location, keyed by rounded coordinates, with per-kind TTLs and at most one
//! upstream call in flight per key.

pub mod api;
pub mod cache;
pub mod key;
pub mod provider;
pub mod retry;
pub mod store;
pub mod types;

pub use api::{ApiResponse, WeatherApi};
pub use cache::{CachePolicy, CacheStats, WeatherCache};
pub use key::{normalize, CacheKey, KeyNormalizer};
pub use provider::{OpenWeatherClient, WeatherUpstream};
pub use retry::RetryConfig;
pub use store::{CacheEntry, TtlStore};
pub use types::*;
