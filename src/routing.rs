//! Traffic collection for scored places and destination cities

use std::sync::Arc;

use futures::{StreamExt, stream};
use tracing::{info, instrument, warn};

use crate::models::{Coordinates, Place};
use crate::providers::TravelTimeProvider;
use crate::recommendation::{CitySignals, TrafficMap, TrafficSample};

/// Travel time from `origin` to every place, defaulting per place on failure
///
/// Lookups run up to `concurrency` at a time; the resulting map does not
/// depend on completion order. Places sharing a name keep the last sample.
/// Each lookup owns its inputs so the returned future stays `Send` for the
/// HTTP handlers.
#[instrument(skip(provider, places), fields(places = places.len()))]
pub async fn collect_traffic(
    provider: &Arc<dyn TravelTimeProvider>,
    origin: Coordinates,
    places: &[Place],
    concurrency: usize,
) -> TrafficMap {
    let lookups: Vec<_> = places
        .iter()
        .map(|place| {
            let provider = Arc::clone(provider);
            let name = place.name.clone();
            let destination = place.coordinates();
            async move {
                let sample = match provider.travel_time(origin, destination).await {
                    Ok(minutes) => Some(TrafficSample::from_travel_time(minutes)),
                    Err(e) => {
                        warn!("Travel time to {} unavailable: {}", name, e);
                        None
                    }
                };
                (name, sample)
            }
        })
        .collect();

    let samples: Vec<(String, Option<TrafficSample>)> = stream::iter(lookups)
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let defaulted = samples.iter().filter(|(_, sample)| sample.is_none()).count();
    if defaulted * 2 > samples.len() {
        warn!(
            "{} of {} travel times fell back to the default; traffic data is mostly estimated",
            defaulted,
            samples.len()
        );
    }

    info!(
        "Collected traffic for {} places ({} defaulted)",
        samples.len(),
        defaulted
    );

    samples
        .into_iter()
        .map(|(name, sample)| (name, sample.unwrap_or_else(TrafficSample::unavailable)))
        .collect()
}

/// City-level traffic between two cities, default when unavailable
pub async fn city_traffic_level(
    provider: &dyn TravelTimeProvider,
    origin: Option<Coordinates>,
    destination: Option<Coordinates>,
) -> u8 {
    let (Some(origin), Some(destination)) = (origin, destination) else {
        return crate::recommendation::destinations::DEFAULT_CITY_TRAFFIC_LEVEL;
    };

    match provider.travel_time(origin, destination).await {
        Ok(minutes) => CitySignals::traffic_level_for(minutes),
        Err(e) => {
            warn!("City travel time unavailable: {}", e);
            crate::recommendation::destinations::DEFAULT_CITY_TRAFFIC_LEVEL
        }
    }
}
