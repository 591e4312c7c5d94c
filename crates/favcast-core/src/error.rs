//! Centralized error types for favcast.
//!
//! This module provides a typed error hierarchy that:
//! - Separates caller mistakes, startup misconfiguration and provider failures
//! - Provides user-friendly messages suitable for a per-widget failure state
//! - Maps each failure onto the HTTP status the weather endpoints report

use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get a UI-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] RequestError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Weather provider error: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::InvalidRequest(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Upstream(e) => e.user_message(),
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }

    /// HTTP status reported to the caller of a weather endpoint.
    pub fn http_status(&self) -> u16 {
        match self {
            AppError::InvalidRequest(_) => 400,
            AppError::Upstream(e) => e.http_status(),
            AppError::Config(_) | AppError::Other(_) => 500,
        }
    }
}

/// Malformed or missing request parameters. Rejected before the cache is consulted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    #[error("Missing lat/lon")]
    MissingCoordinates,

    #[error("{param} is not a number: {value:?}")]
    NotANumber { param: &'static str, value: String },

    #[error("{param} out of range: {value}")]
    OutOfRange { param: &'static str, value: f64 },
}

impl RequestError {
    pub fn user_message(&self) -> &'static str {
        match self {
            RequestError::MissingCoordinates => "A location is required.",
            RequestError::NotANumber { .. } => "Coordinates must be numbers.",
            RequestError::OutOfRange { .. } => "Coordinates are outside the valid range.",
        }
    }
}

/// Configuration errors. Fatal at startup, never raised per request.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::MissingSetting(_) => "A required setting is missing. Check your settings.",
        }
    }
}

/// Failure of a single round trip to the weather provider.
///
/// `Clone` because one failure is delivered to every caller that was waiting
/// on the same in-flight fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    #[error("Request timed out")]
    Timeout,

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Provider returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed provider payload: {0}")]
    Decode(String),
}

impl UpstreamError {
    /// The provider's status code, when the provider answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            UpstreamError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Status passed through to endpoint callers: the provider's own status
    /// when known, 504 for timeouts, 502 for anything else.
    pub fn http_status(&self) -> u16 {
        match self {
            UpstreamError::Status { status, .. } => *status,
            UpstreamError::Timeout => 504,
            UpstreamError::Transport(_) | UpstreamError::Decode(_) => 502,
        }
    }

    /// Transient failures worth another attempt: timeouts, transport
    /// failures, 5xx, 408 and 429. Auth and other 4xx failures are permanent.
    pub fn is_retryable(&self) -> bool {
        match self {
            UpstreamError::Timeout | UpstreamError::Transport(_) => true,
            UpstreamError::Status { status, .. } => {
                *status >= 500 || *status == 408 || *status == 429
            }
            UpstreamError::Decode(_) => false,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            UpstreamError::Timeout => "The weather service timed out. Please try again.",
            UpstreamError::Transport(_) => "Unable to reach the weather service.",
            UpstreamError::Status { status: 401, .. } => {
                "Weather API key is invalid. Check settings."
            }
            UpstreamError::Status { status: 429, .. } => {
                "Weather service rate limit reached. Please wait and try again."
            }
            UpstreamError::Status { status, .. } if *status >= 500 => {
                "Weather service unavailable. Please try again later."
            }
            UpstreamError::Status { .. } => "Weather service error. Please try again.",
            UpstreamError::Decode(_) => "Received unexpected weather data.",
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_upstream_error(self) -> UpstreamError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_upstream_error(self) -> UpstreamError {
        if self.is_timeout() {
            UpstreamError::Timeout
        } else if self.is_decode() {
            UpstreamError::Decode(self.to_string())
        } else if let Some(status) = self.status() {
            UpstreamError::Status {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            UpstreamError::Transport(self.to_string())
        }
    }
}
