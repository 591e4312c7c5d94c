//! Transport-agnostic handlers for the two weather endpoints.
//!
//! Each handler validates `lat`/`lon`, goes through the cache and renders a
//! status code plus JSON body. Whatever HTTP framework fronts them only has
//! to copy `status`, `body` and `cache_control` onto its response.

use std::collections::HashMap;

use favcast_core::{AppError, RequestError};
use serde_json::{json, Value};
use url::form_urlencoded;

use crate::cache::WeatherCache;
use crate::types::{Coordinates, WeatherKind};

/// Responses are always evaluated against the server-side cache
pub const CACHE_CONTROL: &str = "no-store";

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
    pub cache_control: &'static str,
}

impl ApiResponse {
    fn ok(body: Value) -> Self {
        Self {
            status: 200,
            body,
            cache_control: CACHE_CONTROL,
        }
    }

    fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
            cache_control: CACHE_CONTROL,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Clone)]
pub struct WeatherApi {
    cache: WeatherCache,
}

impl WeatherApi {
    pub fn new(cache: WeatherCache) -> Self {
        Self { cache }
    }

    /// Handle a raw query string such as `lat=51.5&lon=-0.12`.
    pub async fn handle_query(&self, kind: WeatherKind, query: &str) -> ApiResponse {
        let params: HashMap<String, String> = form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
        self.handle(kind, &params).await
    }

    /// Handle already-decoded query parameters.
    pub async fn handle(&self, kind: WeatherKind, params: &HashMap<String, String>) -> ApiResponse {
        let coords = match coordinates_from(params) {
            Ok(coords) => coords,
            Err(e) => {
                tracing::debug!("Rejected {} request: {}", kind, e);
                return ApiResponse::error(AppError::from(e.clone()).http_status(), e.to_string());
            }
        };

        match self.cache.get(kind, coords).await {
            Ok(payload) => match payload.to_json() {
                Ok(body) => ApiResponse::ok(body),
                Err(e) => {
                    tracing::error!("Failed to serialize {} payload: {}", kind, e);
                    ApiResponse::error(500, "Failed to encode weather data")
                }
            },
            Err(e) => {
                let err = AppError::from(e);
                ApiResponse::error(err.http_status(), failure_message(kind))
            }
        }
    }
}

fn coordinates_from(params: &HashMap<String, String>) -> Result<Coordinates, RequestError> {
    let lat = params.get("lat").filter(|v| !v.is_empty());
    let lon = params.get("lon").filter(|v| !v.is_empty());
    match (lat, lon) {
        (Some(lat), Some(lon)) => Coordinates::parse(lat, lon),
        _ => Err(RequestError::MissingCoordinates),
    }
}

fn failure_message(kind: WeatherKind) -> &'static str {
    match kind {
        WeatherKind::Current => "Failed to fetch current weather",
        WeatherKind::Forecast => "Failed to fetch forecast",
    }
}
