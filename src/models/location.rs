//! Location model for geographic coordinates and metadata

use haversine::{Location as HaversineLocation, Units, distance};
use serde::{Deserialize, Serialize};

/// A WGS84 point
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lng: f64,
}

impl Coordinates {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Great-circle distance in kilometers
    #[must_use]
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        distance(
            HaversineLocation {
                latitude: self.lat,
                longitude: self.lng,
            },
            HaversineLocation {
                latitude: other.lat,
                longitude: other.lng,
            },
            Units::Kilometers,
        )
    }

    /// Round coordinates for cache key generation
    #[must_use]
    pub fn rounded(&self, precision: u32) -> (f64, f64) {
        let multiplier = 10_f64.powi(i32::try_from(precision).unwrap_or(4));
        let lat = (self.lat * multiplier).round() / multiplier;
        let lng = (self.lng * multiplier).round() / multiplier;
        (lat, lng)
    }

    /// Stable key fragment, rounded to roughly 10 m
    #[must_use]
    pub fn to_key(&self) -> String {
        let (lat, lng) = self.rounded(4);
        format!("{lat:.4},{lng:.4}")
    }
}

/// A resolved place name, e.g. the trip destination or the traveller's origin
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    /// The text the location was resolved from
    pub name: String,
    pub coordinates: Coordinates,
}

impl Location {
    /// Create a new location
    #[must_use]
    pub fn new(name: impl Into<String>, coordinates: Coordinates) -> Self {
        Self {
            name: name.into(),
            coordinates,
        }
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.coordinates.lat, self.coordinates.lng)
    }
}
