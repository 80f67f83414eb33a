//! Trip Planning Module
//!
//! Runs one planning request end to end: resolve the destination, fetch
//! weather, places and traffic, score the places and lay them out over the
//! requested days. Collaborator failures are logged and replaced with their
//! documented defaults; only an invalid request or an unknown destination
//! stops a plan.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::{StreamExt, stream};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::cache::TtlPolicy;
use crate::config::{DefaultsConfig, TripPlannerConfig};
use crate::location_resolver::LocationResolver;
use crate::models::{Coordinates, Location, Place, UserPreferences, WeatherSnapshot};
use crate::providers::{
    Geocoder, GoogleMapsClient, OpenWeatherClient, PlacesProvider, TravelTimeProvider,
    WeatherProvider, http,
};
use crate::recommendation::{
    CityRecord, CitySignals, DestinationRecommendation, ItineraryEntry, ItineraryLayout,
    ProbabilityModel, ScoredPlace, build_itinerary_with_layout, rank_destinations, score_places,
};
use crate::routing;
use crate::{Result, TripPlannerError};

/// A planning request as it arrives from the CLI or the HTTP API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanRequest {
    pub destination: String,
    /// Where the traveller starts; travel times are measured from here
    #[serde(default)]
    pub origin: Option<String>,
    /// Defaults to the configured number of days
    #[serde(default)]
    pub num_days: Option<usize>,
    /// Defaults to the configured weights and trip type
    #[serde(default)]
    pub preferences: Option<UserPreferences>,
    #[serde(default)]
    pub layout: ItineraryLayout,
    /// Places search radius, defaults to the configured radius
    #[serde(default)]
    pub radius_m: Option<u32>,
    /// Intermediate destinations planned with the same settings
    #[serde(default)]
    pub pit_stops: Vec<String>,
}

impl PlanRequest {
    #[must_use]
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            origin: None,
            num_days: None,
            preferences: None,
            layout: ItineraryLayout::default(),
            radius_m: None,
            pit_stops: Vec::new(),
        }
    }

    /// Check the request against the planning limits
    pub fn validate(&self, settings: &PlannerSettings) -> Result<()> {
        if self.destination.trim().is_empty() {
            return Err(TripPlannerError::validation("Destination cannot be empty"));
        }

        let num_days = self.num_days.unwrap_or(settings.num_days);
        if !(1..=settings.max_days).contains(&num_days) {
            return Err(TripPlannerError::validation(format!(
                "Number of days must be between 1 and {}, got {}",
                settings.max_days, num_days
            )));
        }

        if let Some(preferences) = &self.preferences {
            let invalid = preferences.out_of_range_weights();
            if !invalid.is_empty() {
                return Err(TripPlannerError::validation(format!(
                    "{} must be between 0 and 1",
                    invalid.join(", ")
                )));
            }
        }

        if self.radius_m == Some(0) {
            return Err(TripPlannerError::validation(
                "Search radius must be greater than 0",
            ));
        }

        Ok(())
    }
}

/// Planning defaults taken from configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerSettings {
    pub search_radius_m: u32,
    pub num_days: usize,
    pub max_days: usize,
    pub top_picks: usize,
    pub traffic_concurrency: usize,
    pub preferences: UserPreferences,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self::from(&DefaultsConfig::default())
    }
}

impl From<&DefaultsConfig> for PlannerSettings {
    fn from(defaults: &DefaultsConfig) -> Self {
        Self {
            search_radius_m: defaults.search_radius_m,
            num_days: defaults.num_days,
            max_days: defaults.max_days,
            top_picks: defaults.top_picks,
            traffic_concurrency: defaults.traffic_concurrency,
            preferences: UserPreferences::new(
                defaults.weather_importance,
                defaults.crowd_importance,
                defaults.attractions_importance,
                defaults.trip_type,
            ),
        }
    }
}

/// Everything planned for one destination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationPlan {
    pub location: Location,
    pub weather: WeatherSnapshot,
    /// All scored places in ranking order
    pub recommendations: Vec<ScoredPlace>,
    /// The best few of `recommendations`
    pub top_picks: Vec<ScoredPlace>,
    pub itinerary: Vec<ItineraryEntry>,
    pub sorted_by_travel_time: bool,
}

/// A complete trip plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripPlan {
    pub destination: DestinationPlan,
    pub origin: Option<Location>,
    pub num_days: usize,
    pub preferences: UserPreferences,
    pub layout: ItineraryLayout,
    pub pit_stops: Vec<DestinationPlan>,
    pub generated_at: DateTime<Utc>,
}

/// Current weather for a city, [`WeatherSnapshot::unavailable`] on failure
pub async fn weather_snapshot(provider: &dyn WeatherProvider, city: &str) -> WeatherSnapshot {
    match provider.current_weather(city).await {
        Ok(reading) => WeatherSnapshot::from_reading(reading),
        Err(e) => {
            warn!("Weather for {} unavailable, using defaults: {}", city, e);
            WeatherSnapshot::unavailable()
        }
    }
}

/// Trip planning service over the four collaborators
pub struct TripPlanner {
    geocoder: Arc<dyn Geocoder>,
    places: Arc<dyn PlacesProvider>,
    weather: Arc<dyn WeatherProvider>,
    traffic: Arc<dyn TravelTimeProvider>,
    settings: PlannerSettings,
}

impl TripPlanner {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        places: Arc<dyn PlacesProvider>,
        weather: Arc<dyn WeatherProvider>,
        traffic: Arc<dyn TravelTimeProvider>,
        settings: PlannerSettings,
    ) -> Self {
        Self {
            geocoder,
            places,
            weather,
            traffic,
            settings,
        }
    }

    /// Planner backed by Google Maps and OpenWeather
    ///
    /// Without a Google key nothing could be fetched, so this refuses with a
    /// configuration error. A missing weather key only degrades the weather.
    pub fn from_config(config: &TripPlannerConfig) -> Result<Self> {
        if config.google.api_key.is_none() {
            return Err(TripPlannerError::config(format!(
                "Google Maps API key is not configured (set {} or google.api_key)",
                crate::config::GOOGLE_KEY_ENV
            )));
        }

        let client = http::client_from_config(&config.weather)
            .map_err(|e| TripPlannerError::config(e.to_string()))?;
        let ttl = TtlPolicy::from(&config.cache);
        let maps = Arc::new(GoogleMapsClient::new(client.clone(), &config.google, ttl));
        let weather = Arc::new(OpenWeatherClient::new(client, &config.weather, ttl));

        Ok(Self::new(
            maps.clone(),
            maps.clone(),
            weather,
            maps,
            PlannerSettings::from(&config.defaults),
        ))
    }

    #[must_use]
    pub fn settings(&self) -> &PlannerSettings {
        &self.settings
    }

    /// Reject requests that can never produce a plan, before any network call
    pub fn validate(&self, request: &PlanRequest) -> Result<()> {
        request.validate(&self.settings)
    }

    /// Run the full pipeline for a request
    #[instrument(skip(self, request), fields(destination = %request.destination))]
    pub async fn plan(&self, request: &PlanRequest) -> Result<TripPlan> {
        self.validate(request)?;

        let num_days = request.num_days.unwrap_or(self.settings.num_days);
        let preferences = request
            .preferences
            .clone()
            .unwrap_or_else(|| self.settings.preferences.clone());
        let radius = request.radius_m.unwrap_or(self.settings.search_radius_m);

        info!(
            "Planning {}-day {} trip to {}",
            num_days, preferences.trip_type, request.destination
        );

        let location =
            LocationResolver::resolve_location(self.geocoder.as_ref(), &request.destination)
                .await?;
        let origin =
            LocationResolver::resolve_optional(self.geocoder.as_ref(), request.origin.as_deref())
                .await;

        let destination = self
            .plan_destination(
                location,
                origin.as_ref(),
                num_days,
                &preferences,
                request.layout,
                radius,
            )
            .await;

        let mut pit_stops = Vec::new();
        for stop in &request.pit_stops {
            match LocationResolver::resolve_location(self.geocoder.as_ref(), stop).await {
                Ok(stop_location) => pit_stops.push(
                    self.plan_destination(
                        stop_location,
                        origin.as_ref(),
                        num_days,
                        &preferences,
                        request.layout,
                        radius,
                    )
                    .await,
                ),
                Err(e) => warn!("Skipping pit stop '{}': {}", stop, e),
            }
        }

        Ok(TripPlan {
            destination,
            origin,
            num_days,
            preferences,
            layout: request.layout,
            pit_stops,
            generated_at: Utc::now(),
        })
    }

    async fn plan_destination(
        &self,
        location: Location,
        origin: Option<&Location>,
        num_days: usize,
        preferences: &UserPreferences,
        layout: ItineraryLayout,
        radius: u32,
    ) -> DestinationPlan {
        let weather = self.fetch_weather(&location.name).await;
        let places = self.fetch_places(location.coordinates, radius).await;

        let from = origin.map_or(location.coordinates, |origin| origin.coordinates);
        let traffic = routing::collect_traffic(
            &self.traffic,
            from,
            &places,
            self.settings.traffic_concurrency,
        )
        .await;

        let sorted_by_travel_time = origin.is_some();
        let recommendations = score_places(
            &places,
            &traffic,
            weather.quality_score,
            preferences,
            sorted_by_travel_time,
        );
        let itinerary =
            build_itinerary_with_layout(layout, &recommendations, &weather, preferences, num_days);
        let top_picks = recommendations
            .iter()
            .take(self.settings.top_picks)
            .cloned()
            .collect();

        info!(
            "Planned {}: {} places scored, {} itinerary entries",
            location.name,
            recommendations.len(),
            itinerary.len()
        );

        DestinationPlan {
            location,
            weather,
            recommendations,
            top_picks,
            itinerary,
            sorted_by_travel_time,
        }
    }

    /// Current weather for a city, degraded snapshot when unavailable
    pub async fn fetch_weather(&self, city: &str) -> WeatherSnapshot {
        weather_snapshot(self.weather.as_ref(), city).await
    }

    /// Places around a centre, empty when unavailable
    pub async fn fetch_places(&self, center: Coordinates, radius: u32) -> Vec<Place> {
        match self.places.nearby_places(center, radius).await {
            Ok(places) => places,
            Err(e) => {
                warn!("Places search unavailable, continuing without places: {}", e);
                Vec::new()
            }
        }
    }

    /// Rank dataset cities by live weather and traffic from `origin_city`
    #[instrument(skip(self, cities, model, preferences), fields(cities = cities.len()))]
    pub async fn recommend_destinations(
        &self,
        cities: &[CityRecord],
        origin_city: Option<&str>,
        model: Option<&dyn ProbabilityModel>,
        preferences: &UserPreferences,
        top: usize,
    ) -> Result<Vec<DestinationRecommendation>> {
        let invalid = preferences.out_of_range_weights();
        if !invalid.is_empty() {
            return Err(TripPlannerError::validation(format!(
                "{} must be between 0 and 1",
                invalid.join(", ")
            )));
        }

        let origin = LocationResolver::resolve_optional(self.geocoder.as_ref(), origin_city)
            .await
            .map(|location| location.coordinates);

        let lookups: Vec<_> = cities
            .iter()
            .map(|city| {
                let geocoder = Arc::clone(&self.geocoder);
                let weather = Arc::clone(&self.weather);
                let traffic = Arc::clone(&self.traffic);
                let name = city.city.clone();
                async move {
                    let weather = weather_snapshot(weather.as_ref(), &name).await;
                    let coordinates = match geocoder.geocode(&name).await {
                        Ok(coordinates) => Some(coordinates),
                        Err(e) => {
                            warn!("Could not locate {}: {}", name, e);
                            None
                        }
                    };
                    let traffic_level =
                        routing::city_traffic_level(traffic.as_ref(), origin, coordinates).await;
                    (
                        name,
                        CitySignals {
                            weather,
                            traffic_level,
                        },
                    )
                }
            })
            .collect();

        let signals: HashMap<String, CitySignals> = stream::iter(lookups)
            .buffered(self.settings.traffic_concurrency.max(1))
            .collect()
            .await;

        Ok(rank_destinations(cities, &signals, model, preferences, top))
    }
}
