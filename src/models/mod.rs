//! Data models for the TripPlanner application
//!
//! This module contains the core domain models organized by concern:
//! - Location: Geographic coordinates and resolved place names
//! - Place: Candidate points of interest from a places search
//! - Weather: Raw readings and the derived snapshot with its quality score
//! - Preferences: User weights, trip type and season

pub mod location;
pub mod place;
pub mod preferences;
pub mod weather;

// Re-export all public types for convenient access
pub use location::{Coordinates, Location};
pub use place::Place;
pub use preferences::{ScoringWeights, Season, TripType, UserPreferences, WeightStrategy};
pub use weather::{WeatherReading, WeatherSnapshot};
