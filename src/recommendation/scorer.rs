//! Score and rank candidate places against user preferences
//!
//! The score combines weather quality, travel time and place rating:
//!
//! ```text
//! score = 10 * ( weather_importance     * quality / 10
//!              + crowd_importance       * (1 - travel / max_travel) * crowd_factor
//!              + attractions_importance * rating / 5                * attractions_factor )
//! ```
//!
//! `crowd_factor` is the trip-type multiplier for Adventure trips and
//! `attractions_factor` the multiplier for Cultural trips; both are 1
//! otherwise. Missing data never fails: unrated places count as 3.0 and
//! places without a traffic sample as 15 minutes away.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{Place, UserPreferences};

/// Travel time assumed for places without a traffic sample
pub const DEFAULT_TRAVEL_TIME_MINUTES: u32 = 15;
/// Traffic level assumed when the travel time lookup failed
pub const DEFAULT_TRAFFIC_LEVEL: u8 = 5;

/// Result of one travel-time lookup
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct TrafficSample {
    #[serde(alias = "travel_time")]
    pub travel_time_minutes: u32,
    /// Congestion in `1..=10`; informational, the scorer only reads the time
    #[serde(default = "default_traffic_level")]
    pub traffic_level: u8,
}

fn default_traffic_level() -> u8 {
    DEFAULT_TRAFFIC_LEVEL
}

impl TrafficSample {
    /// Sample for a measured travel time; level is `travel_time / 5` in `1..=10`
    #[must_use]
    pub fn from_travel_time(travel_time_minutes: u32) -> Self {
        let level = (travel_time_minutes / 5).clamp(1, 10);
        Self {
            travel_time_minutes,
            // clamped to 1..=10
            traffic_level: level as u8,
        }
    }

    /// Sample substituted when the lookup was unavailable
    #[must_use]
    pub const fn unavailable() -> Self {
        Self {
            travel_time_minutes: DEFAULT_TRAVEL_TIME_MINUTES,
            traffic_level: DEFAULT_TRAFFIC_LEVEL,
        }
    }
}

impl Default for TrafficSample {
    fn default() -> Self {
        Self::unavailable()
    }
}

/// Travel-time samples keyed by place name
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct TrafficMap(HashMap<String, TrafficSample>);

impl TrafficMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, place_name: impl Into<String>, sample: TrafficSample) {
        self.0.insert(place_name.into(), sample);
    }

    #[must_use]
    pub fn get(&self, place_name: &str) -> Option<&TrafficSample> {
        self.0.get(place_name)
    }

    /// Travel time for a place, [`DEFAULT_TRAVEL_TIME_MINUTES`] when absent
    #[must_use]
    pub fn travel_time_for(&self, place_name: &str) -> u32 {
        self.0
            .get(place_name)
            .map_or(DEFAULT_TRAVEL_TIME_MINUTES, |sample| sample.travel_time_minutes)
    }

    /// Largest sampled travel time, never below 1
    ///
    /// Only the samples in the map count; the default used for places
    /// missing from the map does not raise the maximum.
    #[must_use]
    pub fn max_travel_time(&self) -> u32 {
        self.0
            .values()
            .map(|sample| sample.travel_time_minutes)
            .fold(1, u32::max)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, TrafficSample)> for TrafficMap {
    fn from_iter<I: IntoIterator<Item = (String, TrafficSample)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<HashMap<String, u32>> for TrafficMap {
    fn from(travel_times: HashMap<String, u32>) -> Self {
        travel_times
            .into_iter()
            .map(|(name, minutes)| (name, TrafficSample::from_travel_time(minutes)))
            .collect()
    }
}

/// A place with its resolved inputs and composite score
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ScoredPlace {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    /// Rating used for scoring, 3.0 for unrated places
    pub rating: f64,
    pub travel_time_minutes: u32,
    pub category_hints: Vec<String>,
    pub score: f64,
}

/// Rank `places` by composite score, highest first
///
/// With `sort_by_travel_time` the order is travel time ascending with the
/// score descending as tie-break. Sorting is stable, so equal keys keep the
/// input order. An empty input yields an empty ranking.
#[must_use]
pub fn score_places(
    places: &[Place],
    traffic: &TrafficMap,
    weather_quality: u8,
    preferences: &UserPreferences,
    sort_by_travel_time: bool,
) -> Vec<ScoredPlace> {
    let max_travel_time = f64::from(traffic.max_travel_time());
    let weather_term = preferences.weather_importance * f64::from(weather_quality) / 10.0;
    let crowd_factor = preferences.trip_type.crowd_factor();
    let attractions_factor = preferences.trip_type.attractions_factor();

    let mut scored: Vec<ScoredPlace> = places
        .iter()
        .map(|place| {
            let travel_time = traffic.travel_time_for(&place.name);
            let rating = place.rating_or_default();
            let normalized_travel = f64::from(travel_time) / max_travel_time;
            let normalized_rating = rating / 5.0;

            let score = 10.0
                * (weather_term
                    + preferences.crowd_importance * (1.0 - normalized_travel) * crowd_factor
                    + preferences.attractions_importance * normalized_rating * attractions_factor);

            ScoredPlace {
                name: place.name.clone(),
                lat: place.lat,
                lng: place.lng,
                rating,
                travel_time_minutes: travel_time,
                category_hints: place.category_hints.clone(),
                score,
            }
        })
        .collect();

    if sort_by_travel_time {
        scored.sort_by(|a, b| {
            a.travel_time_minutes
                .cmp(&b.travel_time_minutes)
                .then_with(|| descending(a.score, b.score))
        });
    } else {
        scored.sort_by(|a, b| descending(a.score, b.score));
    }

    scored
}

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}
