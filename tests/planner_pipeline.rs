//! End-to-end planning with in-memory collaborators

mod common;

use std::sync::atomic::Ordering;

use common::FakeWorld;
use tripplanner::TripPlannerError;
use tripplanner::models::{Season, TripType, UserPreferences, WeatherSnapshot};
use tripplanner::planner::PlanRequest;
use tripplanner::recommendation::destinations::parse_cities;
use tripplanner::recommendation::{ItineraryLayout, PlaceCategory, TimeSlot};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[tokio::test]
async fn test_plan_scores_and_schedules_places() {
    let (_, planner) = FakeWorld::planner();
    let request = PlanRequest {
        num_days: Some(1),
        preferences: Some(UserPreferences::new(0.3, 0.3, 0.2, TripType::Adventure)),
        ..PlanRequest::new("Bengaluru")
    };

    let plan = planner.plan(&request).await.unwrap();
    let destination = &plan.destination;

    assert_eq!(destination.weather.quality_score, 10);
    assert!(!destination.sorted_by_travel_time);

    let names: Vec<&str> = destination
        .recommendations
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(names, vec!["Museum A", "Park B"]);
    // 10 * (0.3 * 1.0 + 0.3 * (1 - 10/30) * 1.2 + 0.2 * 0.9) = 7.2
    assert!(approx(destination.recommendations[0].score, 7.2));
    // 10 * (0.3 * 1.0 + 0 + 0.2 * 0.6) = 4.2
    assert!(approx(destination.recommendations[1].score, 4.2));

    assert_eq!(destination.itinerary.len(), 2);
    let museum = &destination.itinerary[0];
    assert_eq!(museum.place_name, "Museum A");
    assert_eq!(museum.category, PlaceCategory::Indoor);
    assert_eq!(museum.best_time_slot, TimeSlot::Anytime);
    let park = &destination.itinerary[1];
    assert_eq!(park.category, PlaceCategory::Outdoor);
    assert_eq!(park.best_time_slot, TimeSlot::Morning);
    assert!(destination.itinerary.iter().all(|e| e.day_index == 1));
}

#[tokio::test]
async fn test_origin_switches_to_travel_time_order() {
    let (_, planner) = FakeWorld::planner();
    let request = PlanRequest {
        origin: Some("Home".to_string()),
        ..PlanRequest::new("Bengaluru")
    };

    let plan = planner.plan(&request).await.unwrap();

    assert_eq!(plan.origin.as_ref().map(|o| o.name.as_str()), Some("Home"));
    assert!(plan.destination.sorted_by_travel_time);
    let times: Vec<u32> = plan
        .destination
        .recommendations
        .iter()
        .map(|p| p.travel_time_minutes)
        .collect();
    assert_eq!(times, vec![10, 30]);
}

#[tokio::test]
async fn test_unknown_origin_is_ignored() {
    let (_, planner) = FakeWorld::planner();
    let request = PlanRequest {
        origin: Some("Nowhere".to_string()),
        ..PlanRequest::new("Bengaluru")
    };

    let plan = planner.plan(&request).await.unwrap();

    assert!(plan.origin.is_none());
    assert!(!plan.destination.sorted_by_travel_time);
}

#[tokio::test]
async fn test_unknown_destination_is_not_found() {
    let (_, planner) = FakeWorld::planner();

    let error = planner
        .plan(&PlanRequest::new("Atlantis"))
        .await
        .unwrap_err();

    assert!(matches!(error, TripPlannerError::NotFound { .. }));
    assert!(error.user_message().contains("Atlantis"));
}

#[tokio::test]
async fn test_invalid_request_makes_no_calls() {
    let (world, planner) = FakeWorld::planner();
    let request = PlanRequest {
        num_days: Some(10),
        ..PlanRequest::new("Bengaluru")
    };

    let error = planner.plan(&request).await.unwrap_err();

    assert!(matches!(error, TripPlannerError::Validation { .. }));
    assert_eq!(world.geocode_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_pit_stops_degrade_and_skip() {
    let (_, planner) = FakeWorld::planner();
    let request = PlanRequest {
        pit_stops: vec!["Mysuru".to_string(), "Atlantis".to_string()],
        layout: ItineraryLayout::TimeOfDay,
        ..PlanRequest::new("Bengaluru")
    };

    let plan = planner.plan(&request).await.unwrap();

    assert_eq!(plan.pit_stops.len(), 1);
    let stop = &plan.pit_stops[0];
    assert_eq!(stop.location.name, "Mysuru");
    // weather unavailable for Mysuru
    assert_eq!(stop.weather, WeatherSnapshot::unavailable());
    // no route to the palace: default travel time and rating
    assert_eq!(stop.recommendations[0].travel_time_minutes, 15);
    assert_eq!(stop.recommendations[0].rating, 3.0);
    assert_eq!(stop.itinerary[0].best_time_slot, TimeSlot::Afternoon);
}

#[tokio::test]
async fn test_recommend_destinations_uses_live_signals() {
    let (_, planner) = FakeWorld::planner();
    let cities = parse_cities(
        "City,Ratings,Best Time to visit\nBengaluru,4.2,October to February (winter)\nMysuru,4.4,\n"
            .as_bytes(),
    )
    .unwrap();
    let preferences = UserPreferences::default().with_season(Season::Winter);

    let ranked = planner
        .recommend_destinations(&cities, Some("Home"), None, &preferences, 5)
        .await
        .unwrap();

    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].city, "Bengaluru");
    assert_eq!(ranked[0].season_match, Some(true));
    // no route to Bengaluru's centre: default city traffic
    assert_eq!(ranked[0].traffic_level, 5);
    // Mysuru is 150 minutes away from home
    assert_eq!(ranked[1].traffic_level, 10);
    assert_eq!(ranked[1].weather_quality, 5);
}
