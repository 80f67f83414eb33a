//! Scoring and itinerary building
//!
//! Everything in here is pure: no I/O, no clock, no randomness. The
//! integration layer gathers weather, places and traffic and hands them over.

pub mod category;
pub mod destinations;
pub mod itinerary;
pub mod scorer;

pub use category::PlaceCategory;
pub use destinations::{
    CityRecord, CitySignals, DestinationRecommendation, LogisticModel, ProbabilityModel,
    rank_destinations,
};
pub use itinerary::{
    ItineraryEntry, ItineraryLayout, TimeSlot, TrafficIndicator, build_itinerary,
    build_itinerary_with_layout, entries_by_day,
};
pub use scorer::{ScoredPlace, TrafficMap, TrafficSample, score_places};
