//! Google Maps Platform client: geocoding, nearby search and distance matrix

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};

use super::{Geocoder, PlacesProvider, TravelTimeProvider, Unavailable};
use crate::cache::{self, CacheKind, TtlPolicy};
use crate::config::GoogleConfig;
use crate::models::{Coordinates, Place};

const SERVICE: &str = "Google Maps";
/// Type filter applied to nearby searches
const PLACE_TYPE: &str = "tourist_attraction";

pub struct GoogleMapsClient {
    client: ClientWithMiddleware,
    api_key: Option<String>,
    geocode_url: String,
    places_url: String,
    distance_matrix_url: String,
    ttl: TtlPolicy,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NearbyResult {
    name: String,
    geometry: Geometry,
    rating: Option<f64>,
    #[serde(default)]
    types: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct NearbyResponse {
    status: String,
    #[serde(default)]
    results: Vec<NearbyResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DurationValue {
    /// Seconds
    value: u64,
}

#[derive(Debug, Deserialize)]
struct MatrixElement {
    status: String,
    duration_in_traffic: Option<DurationValue>,
}

#[derive(Debug, Deserialize)]
struct MatrixRow {
    elements: Vec<MatrixElement>,
}

#[derive(Debug, Deserialize)]
struct DistanceMatrixResponse {
    status: String,
    #[serde(default)]
    rows: Vec<MatrixRow>,
    error_message: Option<String>,
}

fn rejected(status: &str, error_message: Option<String>) -> Unavailable {
    let detail = error_message.map(|m| format!(": {m}")).unwrap_or_default();
    Unavailable::malformed(SERVICE, format!("status {status}{detail}"))
}

fn parse_geocode(response: GeocodeResponse, query: &str) -> Result<Coordinates, Unavailable> {
    match response.status.as_str() {
        "OK" => response
            .results
            .into_iter()
            .next()
            .map(|result| Coordinates::new(result.geometry.location.lat, result.geometry.location.lng))
            .ok_or_else(|| Unavailable::NotFound {
                what: format!("Location '{query}'"),
            }),
        "ZERO_RESULTS" => Err(Unavailable::NotFound {
            what: format!("Location '{query}'"),
        }),
        status => Err(rejected(status, response.error_message)),
    }
}

fn parse_nearby(response: NearbyResponse) -> Result<Vec<Place>, Unavailable> {
    match response.status.as_str() {
        "OK" => Ok(response
            .results
            .into_iter()
            .map(|result| Place {
                name: result.name,
                lat: result.geometry.location.lat,
                lng: result.geometry.location.lng,
                rating: result.rating,
                category_hints: result.types,
            })
            .collect()),
        "ZERO_RESULTS" => Ok(Vec::new()),
        status => Err(rejected(status, response.error_message)),
    }
}

fn parse_distance_matrix(response: DistanceMatrixResponse) -> Result<u32, Unavailable> {
    if response.status != "OK" {
        return Err(rejected(&response.status, response.error_message));
    }
    let element = response
        .rows
        .into_iter()
        .next()
        .and_then(|row| row.elements.into_iter().next())
        .ok_or_else(|| Unavailable::malformed(SERVICE, "empty distance matrix"))?;

    if element.status != "OK" {
        return Err(Unavailable::malformed(
            SERVICE,
            format!("element status {}", element.status),
        ));
    }

    let seconds = element
        .duration_in_traffic
        .ok_or_else(|| Unavailable::malformed(SERVICE, "missing duration_in_traffic"))?
        .value;
    Ok(u32::try_from(seconds / 60).unwrap_or(u32::MAX))
}

impl GoogleMapsClient {
    pub fn new(client: ClientWithMiddleware, config: &GoogleConfig, ttl: TtlPolicy) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            geocode_url: config.geocode_url.clone(),
            places_url: config.places_url.clone(),
            distance_matrix_url: config.distance_matrix_url.clone(),
            ttl,
        }
    }

    fn api_key(&self) -> Result<&str, Unavailable> {
        self.api_key
            .as_deref()
            .ok_or(Unavailable::MissingApiKey { service: SERVICE })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, Unavailable> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Unavailable::Status {
                service: SERVICE,
                status: status.as_u16(),
            });
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl Geocoder for GoogleMapsClient {
    #[instrument(skip(self))]
    async fn geocode(&self, query: &str) -> Result<Coordinates, Unavailable> {
        let key = CacheKind::Geocode.key(&query.trim().to_lowercase());
        if let Some(cached) = cache::lookup::<Coordinates>(&key).await {
            return Ok(cached);
        }

        debug!("Calling the geocoding API");
        let url = format!(
            "{}?address={}&key={}",
            self.geocode_url,
            urlencoding::encode(query),
            urlencoding::encode(self.api_key()?)
        );
        let coordinates = parse_geocode(self.get_json(&url).await?, query)?;

        cache::store(&key, coordinates, self.ttl.jittered(CacheKind::Geocode)).await;
        Ok(coordinates)
    }
}

#[async_trait]
impl PlacesProvider for GoogleMapsClient {
    #[instrument(skip(self))]
    async fn nearby_places(
        &self,
        center: Coordinates,
        radius_meters: u32,
    ) -> Result<Vec<Place>, Unavailable> {
        let key = CacheKind::Places.key(&format!("{}:{}", center.to_key(), radius_meters));
        if let Some(cached) = cache::lookup::<Vec<Place>>(&key).await {
            return Ok(cached);
        }

        debug!("Calling the places API");
        let url = format!(
            "{}?location={},{}&radius={}&type={}&key={}",
            self.places_url,
            center.lat,
            center.lng,
            radius_meters,
            PLACE_TYPE,
            urlencoding::encode(self.api_key()?)
        );
        let places = parse_nearby(self.get_json(&url).await?)?;
        info!("Found {} places near {}", places.len(), center.to_key());

        cache::store(&key, places.clone(), self.ttl.jittered(CacheKind::Places)).await;
        Ok(places)
    }
}

#[async_trait]
impl TravelTimeProvider for GoogleMapsClient {
    #[instrument(skip(self))]
    async fn travel_time(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<u32, Unavailable> {
        let key = CacheKind::Traffic.key(&format!("{}-{}", origin.to_key(), destination.to_key()));
        if let Some(cached) = cache::lookup::<u32>(&key).await {
            return Ok(cached);
        }

        debug!("Calling the distance matrix API");
        let url = format!(
            "{}?origins={},{}&destinations={},{}&departure_time=now&traffic_model=best_guess&key={}",
            self.distance_matrix_url,
            origin.lat,
            origin.lng,
            destination.lat,
            destination.lng,
            urlencoding::encode(self.api_key()?)
        );
        let minutes = parse_distance_matrix(self.get_json(&url).await?)?;

        cache::store(&key, minutes, self.ttl.jittered(CacheKind::Traffic)).await;
        Ok(minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_geocode_takes_first_result() {
        let response: GeocodeResponse = serde_json::from_str(
            r#"{"status":"OK","results":[
                {"geometry":{"location":{"lat":48.8566,"lng":2.3522}}},
                {"geometry":{"location":{"lat":33.66,"lng":-95.55}}}
            ]}"#,
        )
        .unwrap();
        let coordinates = parse_geocode(response, "Paris").unwrap();
        assert_eq!(coordinates, Coordinates::new(48.8566, 2.3522));
    }

    #[test]
    fn test_parse_geocode_zero_results_is_not_found() {
        let response: GeocodeResponse =
            serde_json::from_str(r#"{"status":"ZERO_RESULTS","results":[]}"#).unwrap();
        let error = parse_geocode(response, "Atlantis").unwrap_err();
        assert!(error.is_not_found());
        assert_eq!(error.to_string(), "Location 'Atlantis' not found");
    }

    #[test]
    fn test_parse_geocode_denied_is_malformed() {
        let response: GeocodeResponse = serde_json::from_str(
            r#"{"status":"REQUEST_DENIED","results":[],"error_message":"The provided API key is invalid."}"#,
        )
        .unwrap();
        let error = parse_geocode(response, "Paris").unwrap_err();
        assert!(matches!(error, Unavailable::Malformed { .. }));
        assert!(error.to_string().contains("REQUEST_DENIED"));
    }

    #[test]
    fn test_parse_nearby_keeps_missing_ratings() {
        let response: NearbyResponse = serde_json::from_str(
            r#"{"status":"OK","results":[
                {"name":"Louvre","geometry":{"location":{"lat":48.86,"lng":2.33}},"rating":4.7,"types":["museum","point_of_interest"]},
                {"name":"Square","geometry":{"location":{"lat":48.85,"lng":2.34}}}
            ]}"#,
        )
        .unwrap();
        let places = parse_nearby(response).unwrap();
        assert_eq!(places.len(), 2);
        assert_eq!(places[0].rating, Some(4.7));
        assert_eq!(places[0].category_hints, vec!["museum", "point_of_interest"]);
        assert_eq!(places[1].rating, None);
        assert!(places[1].category_hints.is_empty());
    }

    #[test]
    fn test_parse_nearby_zero_results_is_empty() {
        let response: NearbyResponse =
            serde_json::from_str(r#"{"status":"ZERO_RESULTS","results":[]}"#).unwrap();
        assert!(parse_nearby(response).unwrap().is_empty());
    }

    #[test]
    fn test_parse_distance_matrix_uses_traffic_duration() {
        let response: DistanceMatrixResponse = serde_json::from_str(
            r#"{"status":"OK","rows":[{"elements":[
                {"status":"OK","duration":{"value":900},"duration_in_traffic":{"value":1319}}
            ]}]}"#,
        )
        .unwrap();
        assert_eq!(parse_distance_matrix(response).unwrap(), 21);
    }

    #[test]
    fn test_parse_distance_matrix_element_failure() {
        let response: DistanceMatrixResponse = serde_json::from_str(
            r#"{"status":"OK","rows":[{"elements":[{"status":"ZERO_RESULTS"}]}]}"#,
        )
        .unwrap();
        assert!(parse_distance_matrix(response).is_err());
    }

    #[tokio::test]
    async fn test_missing_api_key_is_unavailable() {
        let client = crate::providers::http::build_client(std::time::Duration::from_secs(1), 0)
            .unwrap();
        let maps = GoogleMapsClient::new(client, &GoogleConfig::default(), TtlPolicy::default());

        let error = maps.geocode("Paris").await.unwrap_err();
        assert!(matches!(error, Unavailable::MissingApiKey { .. }));
    }
}
