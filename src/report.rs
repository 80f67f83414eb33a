//! Plain-text rendering of plans for the terminal

use std::fmt::Write;

use crate::models::{Coordinates, WeatherSnapshot};
use crate::planner::{DestinationPlan, TripPlan};
use crate::recommendation::{DestinationRecommendation, ScoredPlace, entries_by_day};

/// Weather headline, e.g. `☀️ Paris: 24.0°C, Clear sky (quality 10/10)`
#[must_use]
pub fn render_weather(city: &str, weather: &WeatherSnapshot) -> String {
    format!(
        "{} {}: {}, {} (quality {}/10)",
        weather.icon(),
        city,
        weather.format_temperature(),
        weather.format_description(),
        weather.quality_score
    )
}

fn render_places(out: &mut String, title: &str, places: &[ScoredPlace]) {
    if places.is_empty() {
        let _ = writeln!(out, "{title}: none found");
        return;
    }

    let _ = writeln!(out, "{title}:");
    for (rank, place) in places.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}. {} (score {:.1}, {:.1} ★, {} mins away)",
            rank + 1,
            place.name,
            place.score,
            place.rating,
            place.travel_time_minutes
        );
    }
}

/// Scored places as a numbered list
#[must_use]
pub fn render_scored_places(title: &str, places: &[ScoredPlace]) -> String {
    let mut out = String::new();
    render_places(&mut out, title, places);
    out
}

fn render_destination(out: &mut String, plan: &DestinationPlan, origin: Option<&str>) {
    let _ = writeln!(out, "{}", render_weather(&plan.location.name, &plan.weather));
    let _ = writeln!(out, "Location: {}", plan.location.format_coordinates());
    let _ = writeln!(out);

    let title = if plan.sorted_by_travel_time {
        "Top picks (closest first)"
    } else {
        "Top picks"
    };
    render_places(out, title, &plan.top_picks);

    if plan.itinerary.is_empty() {
        let _ = writeln!(out, "\nNo itinerary could be built.");
        return;
    }

    for (day, entries) in entries_by_day(&plan.itinerary) {
        let _ = writeln!(out, "\nDay {day}");
        for entry in entries {
            let _ = writeln!(out, "- {entry}");
            let distance = plan
                .location
                .coordinates
                .distance_km(&Coordinates::new(entry.lat, entry.lng));
            let _ = writeln!(out, "   {distance:.1} km from the centre");
            if let Some(origin) = origin {
                let _ = writeln!(out, "   Directions: {}", entry.directions_url(origin));
            }
        }
    }
}

/// Full text report of a trip plan
#[must_use]
pub fn render_plan(plan: &TripPlan) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}-day {} trip to {}",
        plan.num_days, plan.preferences.trip_type, plan.destination.location.name
    );
    if let Some(origin) = &plan.origin {
        let _ = writeln!(out, "Starting from {}", origin.name);
    }
    let _ = writeln!(out);

    let origin = plan.origin.as_ref().map(|origin| origin.name.as_str());
    render_destination(&mut out, &plan.destination, origin);

    for stop in &plan.pit_stops {
        let _ = writeln!(out, "\n=== Pit stop: {} ===", stop.location.name);
        render_destination(&mut out, stop, origin);
    }

    let _ = writeln!(
        out,
        "\nGenerated at {}",
        plan.generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    out
}

/// Ranked destination table
#[must_use]
pub fn render_destinations(recommendations: &[DestinationRecommendation]) -> String {
    let mut out = String::new();
    if recommendations.is_empty() {
        let _ = writeln!(out, "No destinations to recommend.");
        return out;
    }

    let _ = writeln!(out, "Recommended destinations:");
    for (rank, city) in recommendations.iter().enumerate() {
        let _ = write!(
            out,
            "  {}. {} (score {:.2}, weather {}/10, {:.1}°C, traffic {}/10",
            rank + 1,
            city.city,
            city.final_score,
            city.weather_quality,
            city.temperature_celsius,
            city.traffic_level
        );
        if let Some(true) = city.season_match {
            let _ = write!(out, ", in season");
        }
        if let Some(probability) = city.recommendation_score {
            let _ = write!(out, ", model {:.0}%", probability * 100.0);
        }
        let _ = writeln!(out, ")");
    }
    out
}
