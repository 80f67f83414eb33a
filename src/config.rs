//! Configuration management for the `TripPlanner` application
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::TripPlannerError;
use crate::models::TripType;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Conventional variable holding the Google Maps Platform key
pub const GOOGLE_KEY_ENV: &str = "GOOGLE_MAPS_API_KEY";
/// Conventional variable holding the OpenWeather key
pub const OPENWEATHER_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Root configuration structure for the `TripPlanner` application
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TripPlannerConfig {
    /// Google Maps Platform configuration (geocoding, places, traffic)
    #[serde(default)]
    pub google: GoogleConfig,
    /// Weather API configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Default planning settings
    #[serde(default)]
    pub defaults: DefaultsConfig,
    /// HTTP API settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Google Maps Platform settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_geocode_url")]
    pub geocode_url: String,
    #[serde(default = "default_places_url")]
    pub places_url: String,
    #[serde(default = "default_distance_matrix_url")]
    pub distance_matrix_url: String,
}

/// Weather API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    pub api_key: Option<String>,
    /// Base URL of the current-weather endpoint
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Request timeout in seconds, shared by all collaborators
    #[serde(default = "default_weather_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for transient failures
    #[serde(default = "default_weather_max_retries")]
    pub max_retries: u32,
}

/// Cache configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    /// Cache directory location
    #[serde(default = "default_cache_location")]
    pub location: String,
    #[serde(default = "default_geocode_ttl")]
    pub geocode_ttl_minutes: u32,
    #[serde(default = "default_places_ttl")]
    pub places_ttl_minutes: u32,
    #[serde(default = "default_weather_ttl")]
    pub weather_ttl_minutes: u32,
    #[serde(default = "default_traffic_ttl")]
    pub traffic_ttl_minutes: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Default planning settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Places search radius in meters
    #[serde(default = "default_search_radius")]
    pub search_radius_m: u32,
    #[serde(default = "default_num_days")]
    pub num_days: usize,
    #[serde(default = "default_max_days")]
    pub max_days: usize,
    /// Number of places highlighted in a plan summary
    #[serde(default = "default_top_picks")]
    pub top_picks: usize,
    /// Concurrent travel-time lookups per plan
    #[serde(default = "default_traffic_concurrency")]
    pub traffic_concurrency: usize,
    #[serde(default = "default_weather_importance")]
    pub weather_importance: f64,
    #[serde(default = "default_crowd_importance")]
    pub crowd_importance: f64,
    #[serde(default = "default_attractions_importance")]
    pub attractions_importance: f64,
    #[serde(default)]
    pub trip_type: TripType,
}

/// HTTP API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

// Default value functions
fn default_geocode_url() -> String {
    "https://maps.googleapis.com/maps/api/geocode/json".to_string()
}

fn default_places_url() -> String {
    "https://maps.googleapis.com/maps/api/place/nearbysearch/json".to_string()
}

fn default_distance_matrix_url() -> String {
    "https://maps.googleapis.com/maps/api/distancematrix/json".to_string()
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5/weather".to_string()
}

fn default_weather_timeout() -> u32 {
    30
}

fn default_weather_max_retries() -> u32 {
    3
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_location() -> String {
    "~/.cache/tripplanner".to_string()
}

fn default_geocode_ttl() -> u32 {
    24 * 60
}

fn default_places_ttl() -> u32 {
    60
}

fn default_weather_ttl() -> u32 {
    30
}

fn default_traffic_ttl() -> u32 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_search_radius() -> u32 {
    5000
}

fn default_num_days() -> usize {
    3
}

fn default_max_days() -> usize {
    7
}

fn default_top_picks() -> usize {
    5
}

fn default_traffic_concurrency() -> usize {
    4
}

fn default_weather_importance() -> f64 {
    0.3
}

fn default_crowd_importance() -> f64 {
    0.3
}

fn default_attractions_importance() -> f64 {
    0.2
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    60
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            geocode_url: default_geocode_url(),
            places_url: default_places_url(),
            distance_matrix_url: default_distance_matrix_url(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            timeout_seconds: default_weather_timeout(),
            max_retries: default_weather_max_retries(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            location: default_cache_location(),
            geocode_ttl_minutes: default_geocode_ttl(),
            places_ttl_minutes: default_places_ttl(),
            weather_ttl_minutes: default_weather_ttl(),
            traffic_ttl_minutes: default_traffic_ttl(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            search_radius_m: default_search_radius(),
            num_days: default_num_days(),
            max_days: default_max_days(),
            top_picks: default_top_picks(),
            traffic_concurrency: default_traffic_concurrency(),
            weather_importance: default_weather_importance(),
            crowd_importance: default_crowd_importance(),
            attractions_importance: default_attractions_importance(),
            trip_type: TripType::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl TripPlannerConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. TRIPPLANNER_GOOGLE__API_KEY
        builder = builder.add_source(
            Environment::with_prefix("TRIPPLANNER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: TripPlannerConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_conventional_keys(|name| std::env::var(name).ok());
        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tripplanner").join("config.toml"))
    }

    /// Fill missing API keys from the conventional variables
    pub fn apply_conventional_keys<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.google.api_key.is_none() {
            self.google.api_key = lookup(GOOGLE_KEY_ENV).filter(|key| !key.is_empty());
        }
        if self.weather.api_key.is_none() {
            self.weather.api_key = lookup(OPENWEATHER_KEY_ENV).filter(|key| !key.is_empty());
        }
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.google.geocode_url.is_empty() {
            self.google.geocode_url = default_geocode_url();
        }
        if self.google.places_url.is_empty() {
            self.google.places_url = default_places_url();
        }
        if self.google.distance_matrix_url.is_empty() {
            self.google.distance_matrix_url = default_distance_matrix_url();
        }
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_weather_timeout();
        }
        if self.cache.location.is_empty() {
            self.cache.location = default_cache_location();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.defaults.top_picks == 0 {
            self.defaults.top_picks = default_top_picks();
        }
        if self.defaults.traffic_concurrency == 0 {
            self.defaults.traffic_concurrency = default_traffic_concurrency();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Keys are optional, but a configured key must not be blank
    pub fn validate_api_keys(&self) -> Result<()> {
        for (service, key) in [
            ("Google Maps", &self.google.api_key),
            ("OpenWeather", &self.weather.api_key),
        ] {
            if key.as_deref().is_some_and(|key| key.trim().is_empty()) {
                return Err(TripPlannerError::config(format!(
                    "{service} API key cannot be empty if provided. Either remove it or provide a valid key."
                ))
                .into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.weather.timeout_seconds > 300 {
            return Err(TripPlannerError::config("API timeout cannot exceed 300 seconds").into());
        }

        if self.weather.max_retries > 10 {
            return Err(TripPlannerError::config("API max retries cannot exceed 10").into());
        }

        if !(1..=50_000).contains(&self.defaults.search_radius_m) {
            return Err(TripPlannerError::config(
                "Search radius must be between 1 and 50000 meters",
            )
            .into());
        }

        if !(1..=30).contains(&self.defaults.max_days) {
            return Err(TripPlannerError::config("Maximum days must be between 1 and 30").into());
        }

        if !(1..=self.defaults.max_days).contains(&self.defaults.num_days) {
            return Err(TripPlannerError::config(format!(
                "Default number of days must be between 1 and {}",
                self.defaults.max_days
            ))
            .into());
        }

        for (name, weight) in [
            ("weather_importance", self.defaults.weather_importance),
            ("crowd_importance", self.defaults.crowd_importance),
            ("attractions_importance", self.defaults.attractions_importance),
        ] {
            if !(0.0..=1.0).contains(&weight) {
                return Err(TripPlannerError::config(format!(
                    "Default {name} must be between 0 and 1"
                ))
                .into());
            }
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TripPlannerError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TripPlannerError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Geocoding", &self.google.geocode_url),
            ("Places", &self.google.places_url),
            ("Distance matrix", &self.google.distance_matrix_url),
            ("Weather API base", &self.weather.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(TripPlannerError::config(format!(
                    "{name} URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }

    /// Cache directory with a leading `~` expanded
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        match self.cache.location.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| PathBuf::from(&self.cache.location)),
            None => PathBuf::from(&self.cache.location),
        }
    }
}
