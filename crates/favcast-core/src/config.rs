use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Environment variable holding the weather provider credential
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Default provider endpoint (OpenWeather 2.5)
pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

const MAX_KEY_PRECISION: u32 = 8;

/// Longest accepted freshness window (one week)
const MAX_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Upstream weather provider settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Fetch-through cache tuning
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider base URL; requests go to `{base_url}/weather` and `{base_url}/forecast`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Unit system passed to the provider
    #[serde(default = "default_units")]
    pub units: String,

    /// Upper bound on a single provider round trip
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_units() -> String {
    "metric".to_string()
}

fn default_request_timeout_secs() -> u64 {
    5
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            units: default_units(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Freshness window for current conditions
    #[serde(default = "default_ttl_secs")]
    pub current_ttl_secs: u64,

    /// Freshness window for forecasts
    #[serde(default = "default_ttl_secs")]
    pub forecast_ttl_secs: u64,

    /// Decimal places lat/lon are rounded to before keying (4 is roughly 11 m)
    #[serde(default = "default_key_precision")]
    pub key_precision: u32,

    /// Interval of the background expiry sweep; 0 disables it
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Extra attempts after a transient upstream failure
    #[serde(default)]
    pub max_retries: u32,

    #[serde(default = "default_retry_initial_delay_ms")]
    pub retry_initial_delay_ms: u64,

    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

fn default_ttl_secs() -> u64 {
    300
}

fn default_key_precision() -> u32 {
    4
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_retry_initial_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            current_ttl_secs: default_ttl_secs(),
            forecast_ttl_secs: default_ttl_secs(),
            key_precision: default_key_precision(),
            sweep_interval_secs: default_sweep_interval_secs(),
            max_retries: 0,
            retry_initial_delay_ms: default_retry_initial_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Self::default();
            config.save_to(&config_path)?;
            return Ok(config);
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
            .context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated(path: Option<&Path>) -> Result<(Self, ValidationResult)> {
        let config = match path {
            Some(p) => Self::load_from(p)?,
            None => Self::load()?,
        };
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()))
                .context("Configuration validation failed");
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.provider.base_url, "provider.base_url", &mut result);

        if self.provider.units.trim().is_empty() {
            result.add_error("provider.units", "Units must not be empty");
        }

        if self.provider.request_timeout_secs == 0 {
            result.add_error(
                "provider.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        } else if self.provider.request_timeout_secs > 60 {
            result.add_warning(
                "provider.request_timeout_secs",
                "A slow provider will stall every waiting caller for over a minute",
            );
        }

        for (field, ttl, what) in [
            ("cache.current_ttl_secs", self.cache.current_ttl_secs, "current weather"),
            ("cache.forecast_ttl_secs", self.cache.forecast_ttl_secs, "forecasts"),
        ] {
            if ttl == 0 {
                result.add_warning(field, format!("Caching of {} disabled (0 seconds)", what));
            } else if ttl > MAX_TTL_SECS {
                result.add_error(
                    field,
                    format!("TTL must be at most {} seconds", MAX_TTL_SECS),
                );
            }
        }

        if self.cache.key_precision > MAX_KEY_PRECISION {
            result.add_error(
                "cache.key_precision",
                format!("Key precision must be at most {}", MAX_KEY_PRECISION),
            );
        } else if self.cache.key_precision < 2 {
            result.add_warning(
                "cache.key_precision",
                "Precision below 2 decimals merges locations kilometres apart",
            );
        }

        if self.cache.retry_initial_delay_ms > self.cache.retry_max_delay_ms {
            result.add_error(
                "cache.retry_initial_delay_ms",
                "Initial retry delay exceeds the maximum delay",
            );
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// The provider credential. Its absence is fatal at startup.
    pub fn api_key() -> Result<String, ConfigError> {
        std::env::var(API_KEY_ENV)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ConfigError::MissingSetting(API_KEY_ENV.to_string()))
    }

    /// Save configuration to an explicit file
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("favcast");

        Ok(config_dir.join("config.toml"))
    }
}
