//! Partition ranked places into a day-by-day, slot-by-slot schedule
//!
//! Both layouts re-sort the ranked places by travel time (ascending, stable)
//! before assigning anything; the scorer's order only decides ties.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::category::PlaceCategory;
use super::scorer::ScoredPlace;
use crate::models::{UserPreferences, WeatherSnapshot};

/// Places scheduled per day in the day-bucket layout
pub const PLACES_PER_DAY: usize = 4;

/// Travel time below which a place counts as close by in the time-of-day layout
const NEAR_MINUTES: u32 = 25;
/// Travel time below which a place counts as mid-range in the time-of-day layout
const MID_MINUTES: u32 = 40;

/// Suggested time of day for a visit
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum TimeSlot {
    Morning,
    Afternoon,
    Evening,
    Anytime,
    Lunch,
    Dinner,
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TimeSlot::Morning => "Morning",
            TimeSlot::Afternoon => "Afternoon",
            TimeSlot::Evening => "Evening",
            TimeSlot::Anytime => "Anytime",
            TimeSlot::Lunch => "Lunch",
            TimeSlot::Dinner => "Dinner",
        };
        f.write_str(label)
    }
}

/// Traffic shown next to a visit
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum TrafficIndicator {
    /// Under 20 minutes
    Light,
    /// Under 30 minutes
    Moderate,
    Heavy,
}

impl TrafficIndicator {
    #[must_use]
    pub const fn for_travel_time(minutes: u32) -> Self {
        if minutes < 20 {
            TrafficIndicator::Light
        } else if minutes < 30 {
            TrafficIndicator::Moderate
        } else {
            TrafficIndicator::Heavy
        }
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            TrafficIndicator::Light => "🟢",
            TrafficIndicator::Moderate => "🟡",
            TrafficIndicator::Heavy => "🔴",
        }
    }
}

/// How the builder assigns places to days and slots
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ItineraryLayout {
    /// Consecutive chunks of [`PLACES_PER_DAY`] places per day, slot from
    /// the place category
    #[default]
    DayBuckets,
    /// Every place on day 1, slot from travel-time thresholds
    TimeOfDay,
}

impl std::str::FromStr for ItineraryLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day-buckets" | "days" => Ok(ItineraryLayout::DayBuckets),
            "time-of-day" | "slots" => Ok(ItineraryLayout::TimeOfDay),
            other => Err(format!(
                "unknown itinerary layout '{other}'. Must be one of: day-buckets, time-of-day"
            )),
        }
    }
}

/// One scheduled visit
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ItineraryEntry {
    /// 1-based day number
    pub day_index: usize,
    pub place_name: String,
    pub category: PlaceCategory,
    pub best_time_slot: TimeSlot,
    pub travel_time_minutes: u32,
    pub rating: f64,
    pub lat: f64,
    pub lng: f64,
    pub traffic: TrafficIndicator,
}

impl ItineraryEntry {
    fn new(
        day_index: usize,
        place: &ScoredPlace,
        category: PlaceCategory,
        best_time_slot: TimeSlot,
    ) -> Self {
        Self {
            day_index,
            place_name: place.name.clone(),
            category,
            best_time_slot,
            travel_time_minutes: place.travel_time_minutes,
            rating: place.rating,
            lat: place.lat,
            lng: place.lng,
            traffic: TrafficIndicator::for_travel_time(place.travel_time_minutes),
        }
    }

    /// Google Maps directions link from `origin` to this place
    #[must_use]
    pub fn directions_url(&self, origin: &str) -> String {
        format!(
            "https://www.google.com/maps/dir/?api=1&origin={}&destination={}",
            urlencoding::encode(origin),
            urlencoding::encode(&self.place_name)
        )
    }
}

impl fmt::Display for ItineraryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.place_name, self.category)?;
        write!(
            f,
            "   Best time: {}, Travel time: {} mins {}, Rating: {:.1} ★",
            self.best_time_slot,
            self.travel_time_minutes,
            self.traffic.symbol(),
            self.rating
        )
    }
}

/// Build a day-bucket itinerary for `num_days` days
///
/// Places are sorted by travel time and cut into chunks of
/// [`PLACES_PER_DAY`]; emission stops at the first empty day, so fewer days
/// than requested are populated when places run out. `preferences` is
/// accepted for interface symmetry with the scorer and does not influence
/// the layout.
#[must_use]
pub fn build_itinerary(
    ranked_places: &[ScoredPlace],
    weather: &WeatherSnapshot,
    preferences: &UserPreferences,
    num_days: usize,
) -> Vec<ItineraryEntry> {
    build_itinerary_with_layout(
        ItineraryLayout::DayBuckets,
        ranked_places,
        weather,
        preferences,
        num_days,
    )
}

/// Build an itinerary using the given layout
#[must_use]
pub fn build_itinerary_with_layout(
    layout: ItineraryLayout,
    ranked_places: &[ScoredPlace],
    weather: &WeatherSnapshot,
    _preferences: &UserPreferences,
    num_days: usize,
) -> Vec<ItineraryEntry> {
    let by_travel_time = sorted_by_travel_time(ranked_places);
    let outdoor_friendly = weather.is_outdoor_friendly();

    match layout {
        ItineraryLayout::DayBuckets => day_buckets(&by_travel_time, outdoor_friendly, num_days),
        ItineraryLayout::TimeOfDay => time_of_day(&by_travel_time, outdoor_friendly),
    }
}

fn sorted_by_travel_time(places: &[ScoredPlace]) -> Vec<&ScoredPlace> {
    let mut sorted: Vec<&ScoredPlace> = places.iter().collect();
    sorted.sort_by_key(|place| place.travel_time_minutes);
    sorted
}

fn day_buckets(
    sorted: &[&ScoredPlace],
    outdoor_friendly: bool,
    num_days: usize,
) -> Vec<ItineraryEntry> {
    let mut entries = Vec::new();

    for (day, day_places) in sorted.chunks(PLACES_PER_DAY).take(num_days).enumerate() {
        let start_index = day * PLACES_PER_DAY;
        for place in day_places {
            let category = PlaceCategory::from_tags(&place.category_hints);
            let slot = slot_for_category(category, outdoor_friendly, start_index);
            entries.push(ItineraryEntry::new(day + 1, place, category, slot));
        }
    }

    entries
}

/// Slot rule of the day-bucket layout
///
/// The cycling rules key off the day's start index, not the place's own
/// position, so every outdoor place of a day shares one slot.
fn slot_for_category(category: PlaceCategory, outdoor_friendly: bool, start_index: usize) -> TimeSlot {
    match category {
        PlaceCategory::Outdoor if outdoor_friendly => match start_index % 3 {
            0 => TimeSlot::Morning,
            1 => TimeSlot::Afternoon,
            _ => TimeSlot::Evening,
        },
        PlaceCategory::Indoor => TimeSlot::Anytime,
        PlaceCategory::Dining => {
            if start_index % 2 == 0 {
                TimeSlot::Lunch
            } else {
                TimeSlot::Dinner
            }
        }
        _ => TimeSlot::Afternoon,
    }
}

fn time_of_day(sorted: &[&ScoredPlace], outdoor_friendly: bool) -> Vec<ItineraryEntry> {
    let mut morning = Vec::new();
    let mut afternoon = Vec::new();
    let mut evening = Vec::new();

    for place in sorted {
        let travel_time = place.travel_time_minutes;
        if travel_time < NEAR_MINUTES && outdoor_friendly {
            morning.push(ItineraryEntry::new(1, place, PlaceCategory::Outdoor, TimeSlot::Morning));
        } else if travel_time < MID_MINUTES {
            afternoon.push(ItineraryEntry::new(1, place, PlaceCategory::Mixed, TimeSlot::Afternoon));
        } else {
            evening.push(ItineraryEntry::new(
                1,
                place,
                PlaceCategory::IndoorOrDining,
                TimeSlot::Evening,
            ));
        }
    }

    morning.extend(afternoon);
    morning.extend(evening);
    morning
}

/// Group entries by day, preserving order within each day
#[must_use]
pub fn entries_by_day(entries: &[ItineraryEntry]) -> Vec<(usize, Vec<&ItineraryEntry>)> {
    let mut days: Vec<(usize, Vec<&ItineraryEntry>)> = Vec::new();
    for entry in entries {
        match days.last_mut() {
            Some((day, group)) if *day == entry.day_index => group.push(entry),
            _ => days.push((entry.day_index, vec![entry])),
        }
    }
    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WeatherReading;
    use rstest::rstest;

    fn scored(name: &str, travel_time: u32, hints: &[&str]) -> ScoredPlace {
        ScoredPlace {
            name: name.to_string(),
            lat: 0.0,
            lng: 0.0,
            rating: 4.0,
            travel_time_minutes: travel_time,
            category_hints: hints.iter().map(|h| (*h).to_string()).collect(),
            score: 5.0,
        }
    }

    fn weather(condition: &str) -> WeatherSnapshot {
        WeatherSnapshot::from_reading(WeatherReading {
            condition: condition.to_string(),
            temperature_celsius: 24.0,
        })
    }

    fn ten_places() -> Vec<ScoredPlace> {
        // deliberately not in travel-time order
        [50, 5, 45, 10, 40, 15, 35, 20, 30, 25]
            .iter()
            .enumerate()
            .map(|(i, t)| scored(&format!("P{i}"), *t, &["tourist_attraction"]))
            .collect()
    }

    #[test]
    fn test_ten_places_three_days_split_four_four_two() {
        let entries = build_itinerary(
            &ten_places(),
            &weather("clear sky"),
            &UserPreferences::default(),
            3,
        );

        let days = entries_by_day(&entries);
        let sizes: Vec<usize> = days.iter().map(|(_, group)| group.len()).collect();
        assert_eq!(sizes, vec![4, 4, 2]);
        assert_eq!(days.iter().map(|(d, _)| *d).collect::<Vec<_>>(), vec![1, 2, 3]);

        for (_, group) in &days {
            assert!(group
                .windows(2)
                .all(|w| w[0].travel_time_minutes <= w[1].travel_time_minutes));
        }
        let times: Vec<u32> = entries.iter().map(|e| e.travel_time_minutes).collect();
        assert_eq!(times, vec![5, 10, 15, 20, 25, 30, 35, 40, 45, 50]);
    }

    #[test]
    fn test_stops_when_places_run_out() {
        let entries = build_itinerary(
            &ten_places(),
            &weather("clear sky"),
            &UserPreferences::default(),
            7,
        );
        let days = entries_by_day(&entries);
        assert_eq!(days.len(), 3);
        assert_eq!(entries.len(), 10);
    }

    #[test]
    fn test_caps_entries_at_four_per_day() {
        let entries = build_itinerary(
            &ten_places(),
            &weather("clear sky"),
            &UserPreferences::default(),
            1,
        );
        assert_eq!(entries.len(), 4);
        assert!(entries.iter().all(|e| e.day_index == 1));
    }

    #[test]
    fn test_empty_places_or_zero_days() {
        let prefs = UserPreferences::default();
        assert!(build_itinerary(&[], &weather("clear sky"), &prefs, 3).is_empty());
        assert!(build_itinerary(&ten_places(), &weather("clear sky"), &prefs, 0).is_empty());
        assert!(build_itinerary_with_layout(
            ItineraryLayout::TimeOfDay,
            &[],
            &weather("clear sky"),
            &prefs,
            3
        )
        .is_empty());
    }

    #[rstest]
    #[case(0, TimeSlot::Morning)]
    #[case(4, TimeSlot::Afternoon)]
    #[case(8, TimeSlot::Evening)]
    #[case(12, TimeSlot::Morning)]
    fn test_outdoor_slot_cycles_by_day_start(#[case] start_index: usize, #[case] expected: TimeSlot) {
        assert_eq!(slot_for_category(PlaceCategory::Outdoor, true, start_index), expected);
    }

    #[rstest]
    #[case(PlaceCategory::Outdoor, false, 0, TimeSlot::Afternoon)]
    #[case(PlaceCategory::Indoor, true, 4, TimeSlot::Anytime)]
    #[case(PlaceCategory::Dining, true, 0, TimeSlot::Lunch)]
    #[case(PlaceCategory::Dining, false, 4, TimeSlot::Lunch)]
    #[case(PlaceCategory::Dining, false, 3, TimeSlot::Dinner)]
    #[case(PlaceCategory::Mixed, true, 0, TimeSlot::Afternoon)]
    fn test_slot_rules(
        #[case] category: PlaceCategory,
        #[case] outdoor_friendly: bool,
        #[case] start_index: usize,
        #[case] expected: TimeSlot,
    ) {
        assert_eq!(slot_for_category(category, outdoor_friendly, start_index), expected);
    }

    #[test]
    fn test_categories_and_slots_in_built_itinerary() {
        let places = vec![
            scored("Park", 5, &["park"]),
            scored("Museum", 6, &["museum"]),
            scored("Cafe", 7, &["cafe"]),
            scored("Temple", 8, &["place_of_worship"]),
            scored("Zoo", 9, &["zoo"]),
        ];
        let entries = build_itinerary(&places, &weather("sunny"), &UserPreferences::default(), 2);

        let summary: Vec<(usize, &str, PlaceCategory, TimeSlot)> = entries
            .iter()
            .map(|e| (e.day_index, e.place_name.as_str(), e.category, e.best_time_slot))
            .collect();
        assert_eq!(
            summary,
            vec![
                (1, "Park", PlaceCategory::Outdoor, TimeSlot::Morning),
                (1, "Museum", PlaceCategory::Indoor, TimeSlot::Anytime),
                (1, "Cafe", PlaceCategory::Dining, TimeSlot::Lunch),
                (1, "Temple", PlaceCategory::Mixed, TimeSlot::Afternoon),
                (2, "Zoo", PlaceCategory::Outdoor, TimeSlot::Afternoon),
            ]
        );
    }

    #[test]
    fn test_time_of_day_layout_buckets_by_threshold() {
        let places = vec![
            scored("Far", 45, &[]),
            scored("Near", 10, &[]),
            scored("Mid", 30, &[]),
            scored("Edge", 25, &[]),
        ];
        let entries = build_itinerary_with_layout(
            ItineraryLayout::TimeOfDay,
            &places,
            &weather("few clouds"),
            &UserPreferences::default(),
            3,
        );

        let summary: Vec<(&str, TimeSlot, PlaceCategory)> = entries
            .iter()
            .map(|e| (e.place_name.as_str(), e.best_time_slot, e.category))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Near", TimeSlot::Morning, PlaceCategory::Outdoor),
                ("Edge", TimeSlot::Afternoon, PlaceCategory::Mixed),
                ("Mid", TimeSlot::Afternoon, PlaceCategory::Mixed),
                ("Far", TimeSlot::Evening, PlaceCategory::IndoorOrDining),
            ]
        );
        assert!(entries.iter().all(|e| e.day_index == 1));
    }

    #[test]
    fn test_time_of_day_layout_without_friendly_weather() {
        let places = vec![scored("Near", 10, &[]), scored("Far", 60, &[])];
        let entries = build_itinerary_with_layout(
            ItineraryLayout::TimeOfDay,
            &places,
            &weather("light rain"),
            &UserPreferences::default(),
            1,
        );
        assert_eq!(entries.len(), places.len());
        assert_eq!(entries[0].best_time_slot, TimeSlot::Afternoon);
        assert_eq!(entries[1].best_time_slot, TimeSlot::Evening);
    }

    #[test]
    fn test_traffic_indicator_thresholds() {
        assert_eq!(TrafficIndicator::for_travel_time(19), TrafficIndicator::Light);
        assert_eq!(TrafficIndicator::for_travel_time(20), TrafficIndicator::Moderate);
        assert_eq!(TrafficIndicator::for_travel_time(29), TrafficIndicator::Moderate);
        assert_eq!(TrafficIndicator::for_travel_time(30), TrafficIndicator::Heavy);
    }

    #[test]
    fn test_directions_url_is_encoded() {
        let entry = ItineraryEntry::new(1, &scored("Lalbagh Botanical Garden", 12, &["park"]), PlaceCategory::Outdoor, TimeSlot::Morning);
        assert_eq!(
            entry.directions_url("MG Road"),
            "https://www.google.com/maps/dir/?api=1&origin=MG%20Road&destination=Lalbagh%20Botanical%20Garden"
        );
    }
}
