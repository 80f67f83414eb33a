//! `TripPlanner` - Weather- and traffic-aware city trip planning
//!
//! This library scores nearby attractions against live weather, traffic and
//! user preferences, lays them out into a day-by-day itinerary, and ranks
//! whole destinations from a city dataset.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod location_resolver;
pub mod models;
pub mod planner;
pub mod providers;
pub mod recommendation;
pub mod report;
pub mod routing;
pub mod web;

// Re-export core types for public API
pub use config::TripPlannerConfig;
pub use error::TripPlannerError;
pub use models::{Coordinates, Location, Place, UserPreferences, WeatherSnapshot};
pub use planner::{PlanRequest, TripPlan, TripPlanner};
pub use recommendation::{ItineraryEntry, ScoredPlace, build_itinerary, score_places};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TripPlannerError>;
