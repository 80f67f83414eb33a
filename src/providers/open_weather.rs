//! OpenWeather current-conditions client

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{Unavailable, WeatherProvider};
use crate::cache::{self, CacheKind, TtlPolicy};
use crate::config::WeatherConfig;
use crate::models::WeatherReading;

const SERVICE: &str = "OpenWeather";
/// Temperatures feed the Celsius quality rule, so requests are always metric
const UNITS: &str = "metric";

pub struct OpenWeatherClient {
    client: ClientWithMiddleware,
    api_key: Option<String>,
    base_url: String,
    ttl: TtlPolicy,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct ConditionBlock {
    description: String,
}

#[derive(Debug, Deserialize)]
struct CurrentWeatherResponse {
    main: MainBlock,
    #[serde(default)]
    weather: Vec<ConditionBlock>,
}

fn parse_current(response: CurrentWeatherResponse) -> Result<WeatherReading, Unavailable> {
    let condition = response
        .weather
        .into_iter()
        .next()
        .map(|block| block.description)
        .ok_or_else(|| Unavailable::malformed(SERVICE, "no weather conditions in response"))?;

    Ok(WeatherReading {
        condition,
        temperature_celsius: response.main.temp,
    })
}

impl OpenWeatherClient {
    pub fn new(client: ClientWithMiddleware, config: &WeatherConfig, ttl: TtlPolicy) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            ttl,
        }
    }

    fn current_weather_url(&self, city: &str, api_key: &str) -> String {
        format!(
            "{}?q={}&appid={}&units={}",
            self.base_url,
            urlencoding::encode(city),
            urlencoding::encode(api_key),
            UNITS
        )
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    #[instrument(skip(self))]
    async fn current_weather(&self, city: &str) -> Result<WeatherReading, Unavailable> {
        let key = CacheKind::Weather.key(&city.trim().to_lowercase());
        if let Some(cached) = cache::lookup::<WeatherReading>(&key).await {
            return Ok(cached);
        }

        let api_key = self
            .api_key
            .as_deref()
            .ok_or(Unavailable::MissingApiKey { service: SERVICE })?;

        debug!("Calling the weather API");
        let url = self.current_weather_url(city, api_key);

        let response = self.client.get(&url).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(Unavailable::NotFound {
                    what: format!("Weather for '{city}'"),
                });
            }
            status if !status.is_success() => {
                return Err(Unavailable::Status {
                    service: SERVICE,
                    status: status.as_u16(),
                });
            }
            _ => {}
        }

        let reading = parse_current(response.json::<CurrentWeatherResponse>().await?)?;

        cache::store(&key, reading.clone(), self.ttl.jittered(CacheKind::Weather)).await;
        Ok(reading)
    }
}
