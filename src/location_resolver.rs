//! Location Resolution Module
//!
//! Turns free-text destination and origin names into resolved locations.

use crate::models::Location;
use crate::providers::{Geocoder, Unavailable};
use crate::{Result, TripPlannerError};
use tracing::{debug, warn};

/// Service for resolving location inputs
pub struct LocationResolver;

impl LocationResolver {
    /// Resolve a required location, e.g. the trip destination
    ///
    /// An unknown name is a [`TripPlannerError::NotFound`]; any other
    /// collaborator failure is a [`TripPlannerError::Api`].
    pub async fn resolve_location(geocoder: &dyn Geocoder, name: &str) -> Result<Location> {
        let name = name.trim();
        debug!("Resolving location input: {}", name);

        match geocoder.geocode(name).await {
            Ok(coordinates) => {
                debug!(
                    "Resolved location: {} at ({:.4}, {:.4})",
                    name, coordinates.lat, coordinates.lng
                );
                Ok(Location::new(name, coordinates))
            }
            Err(e) if e.is_not_found() => Err(TripPlannerError::not_found(format!(
                "Could not find location '{name}'"
            ))),
            Err(Unavailable::MissingApiKey { service }) => Err(TripPlannerError::config(
                format!("no API key configured for {service}"),
            )),
            Err(e) => Err(TripPlannerError::api(format!(
                "Geocoding '{name}' failed: {e}"
            ))),
        }
    }

    /// Resolve an optional location, e.g. the traveller's origin
    ///
    /// Any failure is logged and treated as "no location".
    pub async fn resolve_optional(geocoder: &dyn Geocoder, name: Option<&str>) -> Option<Location> {
        let name = name.map(str::trim).filter(|name| !name.is_empty())?;
        match Self::resolve_location(geocoder, name).await {
            Ok(location) => Some(location),
            Err(e) => {
                warn!("Ignoring location '{}': {}", name, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinates;
    use async_trait::async_trait;

    struct KnownCities;

    #[async_trait]
    impl Geocoder for KnownCities {
        async fn geocode(&self, query: &str) -> std::result::Result<Coordinates, Unavailable> {
            match query {
                "Paris" => Ok(Coordinates::new(48.8566, 2.3522)),
                "Offline" => Err(Unavailable::malformed("test", "timeout")),
                other => Err(Unavailable::NotFound {
                    what: other.to_string(),
                }),
            }
        }
    }

    #[tokio::test]
    async fn test_resolve_known_location_trims_name() {
        let location = LocationResolver::resolve_location(&KnownCities, "  Paris ")
            .await
            .unwrap();
        assert_eq!(location.name, "Paris");
        assert_eq!(location.format_coordinates(), "48.8566, 2.3522");
    }

    #[tokio::test]
    async fn test_unknown_location_is_not_found() {
        let error = LocationResolver::resolve_location(&KnownCities, "Atlantis")
            .await
            .unwrap_err();
        assert!(matches!(error, TripPlannerError::NotFound { .. }));

        let error = LocationResolver::resolve_location(&KnownCities, "Offline")
            .await
            .unwrap_err();
        assert!(matches!(error, TripPlannerError::Api { .. }));
    }

    #[tokio::test]
    async fn test_optional_location_swallows_failures() {
        assert!(
            LocationResolver::resolve_optional(&KnownCities, Some("Atlantis"))
                .await
                .is_none()
        );
        assert!(
            LocationResolver::resolve_optional(&KnownCities, Some(" "))
                .await
                .is_none()
        );
        assert!(
            LocationResolver::resolve_optional(&KnownCities, Some("Paris"))
                .await
                .is_some()
        );
    }
}
