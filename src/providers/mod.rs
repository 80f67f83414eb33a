//! External collaborators: geocoding, places search, weather and traffic
//!
//! Every collaborator returns `Result<_, Unavailable>`. Callers decide which
//! default to substitute; nothing in here falls back on its own.

pub mod google_maps;
pub mod http;
pub mod open_weather;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Coordinates, Place, WeatherReading};

pub use google_maps::GoogleMapsClient;
pub use open_weather::OpenWeatherClient;

/// Why a collaborator could not deliver a value
#[derive(Error, Debug)]
pub enum Unavailable {
    #[error("no API key configured for {service}")]
    MissingApiKey { service: &'static str },

    #[error("request failed: {0}")]
    Request(#[from] reqwest_middleware::Error),

    #[error("failed to decode response: {0}")]
    Decode(#[from] reqwest::Error),

    #[error("{service} responded with HTTP {status}")]
    Status { service: &'static str, status: u16 },

    #[error("{what} not found")]
    NotFound { what: String },

    #[error("malformed {service} response: {message}")]
    Malformed {
        service: &'static str,
        message: String,
    },
}

impl Unavailable {
    pub fn malformed<S: Into<String>>(service: &'static str, message: S) -> Self {
        Self::Malformed {
            service,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Unavailable::NotFound { .. })
    }
}

/// Free-text place name to coordinates
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str) -> Result<Coordinates, Unavailable>;
}

/// Points of interest around a centre
#[async_trait]
pub trait PlacesProvider: Send + Sync {
    async fn nearby_places(
        &self,
        center: Coordinates,
        radius_meters: u32,
    ) -> Result<Vec<Place>, Unavailable>;
}

/// Current conditions for a city
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current_weather(&self, city: &str) -> Result<WeatherReading, Unavailable>;
}

/// Driving time in whole minutes under current traffic
#[async_trait]
pub trait TravelTimeProvider: Send + Sync {
    async fn travel_time(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<u32, Unavailable>;
}
