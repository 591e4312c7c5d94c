//! OpenWeather client.
//!
//! One round trip per call: no caching and no retries here. Both belong to
//! the fetch-through cache in front of it.

use async_trait::async_trait;
use favcast_core::{ProviderConfig, ReqwestErrorExt, UpstreamError};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::instrument;
use url::Url;

use crate::types::{Coordinates, ForecastSeries, WeatherSnapshot};

const USER_AGENT: &str = concat!("favcast/", env!("CARGO_PKG_VERSION"));

/// Longest provider error body carried into an `UpstreamError`
const MAX_ERROR_BODY: usize = 256;

/// Source of weather data the cache fetches through.
#[async_trait]
pub trait WeatherUpstream: Send + Sync {
    async fn fetch_current(&self, coords: Coordinates) -> Result<WeatherSnapshot, UpstreamError>;

    async fn fetch_forecast(&self, coords: Coordinates) -> Result<ForecastSeries, UpstreamError>;
}

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: Client,
    base_url: Url,
    api_key: String,
    units: String,
}

impl OpenWeatherClient {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, UpstreamError> {
        // Trailing slash so `join` appends rather than replaces the last segment
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized)
            .map_err(|e| UpstreamError::Transport(format!("invalid base URL {}: {}", base_url, e)))?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| e.into_upstream_error())?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
            units: "metric".to_string(),
        })
    }

    pub fn from_config(config: &ProviderConfig, api_key: impl Into<String>) -> Result<Self, UpstreamError> {
        let client = Self::new(
            &config.base_url,
            api_key,
            Duration::from_secs(config.request_timeout_secs),
        )?;
        Ok(client.with_units(&config.units))
    }

    pub fn with_units(mut self, units: &str) -> Self {
        self.units = units.to_string();
        self
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &str,
        coords: Coordinates,
    ) -> Result<T, UpstreamError> {
        let url = self
            .base_url
            .join(resource)
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let response = self
            .client
            .get(url)
            .query(&[
                ("lat", coords.latitude.to_string()),
                ("lon", coords.longitude.to_string()),
                ("units", self.units.clone()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .await
            .map_err(|e| e.into_upstream_error())?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message: String = body.chars().take(MAX_ERROR_BODY).collect();
            tracing::warn!("OpenWeather /{} returned {}: {}", resource, status, message);
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await.map_err(|e| e.into_upstream_error())?;
        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::warn!("OpenWeather /{} payload did not decode: {}", resource, e);
            UpstreamError::Decode(e.to_string())
        })
    }
}

#[async_trait]
impl WeatherUpstream for OpenWeatherClient {
    #[instrument(skip(self), level = "info")]
    async fn fetch_current(&self, coords: Coordinates) -> Result<WeatherSnapshot, UpstreamError> {
        self.get_json("weather", coords).await
    }

    #[instrument(skip(self), level = "info")]
    async fn fetch_forecast(&self, coords: Coordinates) -> Result<ForecastSeries, UpstreamError> {
        self.get_json("forecast", coords).await
    }
}
