//! In-memory collaborators shared by the integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tripplanner::models::WeatherReading;
use tripplanner::planner::{PlannerSettings, TripPlanner};
use tripplanner::providers::{
    Geocoder, PlacesProvider, TravelTimeProvider, Unavailable, WeatherProvider,
};
use tripplanner::{Coordinates, Place};

pub const BENGALURU: Coordinates = Coordinates::new(12.9716, 77.5946);
pub const MYSURU: Coordinates = Coordinates::new(12.2958, 76.6394);
pub const HOME: Coordinates = Coordinates::new(13.0358, 77.5970);

/// A tiny fixed world: two cities, a few attractions, one sunny forecast
#[derive(Default)]
pub struct FakeWorld {
    pub geocode_calls: AtomicUsize,
}

impl FakeWorld {
    pub fn planner() -> (Arc<FakeWorld>, TripPlanner) {
        let world = Arc::new(FakeWorld::default());
        let planner = TripPlanner::new(
            world.clone(),
            world.clone(),
            world.clone(),
            world.clone(),
            PlannerSettings::default(),
        );
        (world, planner)
    }

    fn travel_times() -> HashMap<String, u32> {
        HashMap::from([
            (Coordinates::new(12.9791, 77.5913).to_key(), 10),
            (Coordinates::new(12.9507, 77.5848).to_key(), 30),
            (MYSURU.to_key(), 150),
        ])
    }
}

#[async_trait]
impl Geocoder for FakeWorld {
    async fn geocode(&self, query: &str) -> Result<Coordinates, Unavailable> {
        self.geocode_calls.fetch_add(1, Ordering::SeqCst);
        match query {
            "Bengaluru" => Ok(BENGALURU),
            "Mysuru" => Ok(MYSURU),
            "Home" => Ok(HOME),
            other => Err(Unavailable::NotFound {
                what: format!("Location '{other}'"),
            }),
        }
    }
}

#[async_trait]
impl PlacesProvider for FakeWorld {
    async fn nearby_places(
        &self,
        center: Coordinates,
        _radius_meters: u32,
    ) -> Result<Vec<Place>, Unavailable> {
        if center == BENGALURU {
            Ok(vec![
                Place::new("Museum A", 12.9791, 77.5913)
                    .with_rating(4.5)
                    .with_hints(["museum", "tourist_attraction"]),
                Place::new("Park B", 12.9507, 77.5848)
                    .with_rating(3.0)
                    .with_hints(["park"]),
            ])
        } else if center == MYSURU {
            Ok(vec![
                Place::new("Palace", 12.3052, 76.6552).with_hints(["tourist_attraction"]),
            ])
        } else {
            Err(Unavailable::malformed("fake", "no places here"))
        }
    }
}

#[async_trait]
impl WeatherProvider for FakeWorld {
    async fn current_weather(&self, city: &str) -> Result<WeatherReading, Unavailable> {
        match city {
            "Bengaluru" => Ok(WeatherReading {
                condition: "clear sky".to_string(),
                temperature_celsius: 25.0,
            }),
            _ => Err(Unavailable::Status {
                service: "fake",
                status: 503,
            }),
        }
    }
}

#[async_trait]
impl TravelTimeProvider for FakeWorld {
    async fn travel_time(
        &self,
        _origin: Coordinates,
        destination: Coordinates,
    ) -> Result<u32, Unavailable> {
        Self::travel_times()
            .get(&destination.to_key())
            .copied()
            .ok_or_else(|| Unavailable::malformed("fake", "no route"))
    }
}
