//! Rank destination cities from a static dataset
//!
//! Each city gets live weather and a traffic level relative to the chosen
//! origin, a set of engineered features for an optional classifier, and a
//! weighted final score built the same way as the place scorer but on the
//! city-level signals.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::models::{UserPreferences, WeatherSnapshot, WeightStrategy};

/// Best-time value used when the dataset leaves it blank
pub const YEAR_ROUND: &str = "Throughout the year";
/// Attractions score every city is assumed to have
const ATTRACTIONS_SCORE: f64 = 5.0;
/// Traffic level used when a city's travel time is unknown
pub const DEFAULT_CITY_TRAFFIC_LEVEL: u8 = 5;

/// One row of the destination dataset
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CityRecord {
    pub city: String,
    pub rating: Option<f64>,
    pub best_time_to_visit: String,
    pub year_round: bool,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "City")]
    city: String,
    #[serde(rename = "Ratings", default)]
    ratings: Option<f64>,
    #[serde(rename = "Best Time to visit", default)]
    best_time_to_visit: Option<String>,
}

impl CityRecord {
    fn from_row(row: CsvRow) -> Self {
        let best_time_to_visit = row
            .best_time_to_visit
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| YEAR_ROUND.to_string());
        let year_round = best_time_to_visit.contains(YEAR_ROUND);
        Self {
            city: row.city.trim().to_string(),
            rating: row.ratings,
            best_time_to_visit,
            year_round,
        }
    }
}

/// Load the destination dataset from a CSV file
pub fn load_cities<P: AsRef<Path>>(path: P) -> Result<Vec<CityRecord>> {
    let path = path.as_ref();
    info!("Loading destination dataset from: {:?}", path);
    let file = File::open(path)
        .with_context(|| format!("Failed to open destination dataset {}", path.display()))?;
    parse_cities(file)
}

/// Parse the destination dataset
///
/// Only `City` is required; `Ratings` and `Best Time to visit` are optional
/// and any other column is ignored. Names are trimmed and later duplicates
/// of a city are dropped.
pub fn parse_cities<R: Read>(reader: R) -> Result<Vec<CityRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let mut seen = HashSet::new();
    let mut cities = Vec::new();
    let mut skipped = 0;

    for row in csv_reader.deserialize::<CsvRow>() {
        match row {
            Ok(row) => {
                let record = CityRecord::from_row(row);
                if record.city.is_empty() {
                    skipped += 1;
                    continue;
                }
                if seen.insert(record.city.clone()) {
                    cities.push(record);
                } else {
                    debug!("Dropping duplicate city {}", record.city);
                }
            }
            Err(e) => {
                warn!("Skipping malformed dataset row: {}", e);
                skipped += 1;
            }
        }
    }

    info!(
        "Loaded {} destinations ({} rows skipped)",
        cities.len(),
        skipped
    );
    Ok(cities)
}

/// Live signals gathered for one city
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CitySignals {
    pub weather: WeatherSnapshot,
    /// Congestion in `1..=10` on the way from the origin city
    pub traffic_level: u8,
}

impl CitySignals {
    /// Traffic level for a measured travel time: `travel_time / 10` in `1..=10`
    #[must_use]
    pub fn traffic_level_for(travel_time_minutes: u32) -> u8 {
        // clamped to 1..=10
        (travel_time_minutes / 10).clamp(1, 10) as u8
    }

    /// Signals substituted when nothing could be fetched for a city
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            weather: WeatherSnapshot::unavailable(),
            traffic_level: DEFAULT_CITY_TRAFFIC_LEVEL,
        }
    }
}

/// Named numeric features handed to a [`ProbabilityModel`]
pub type FeatureVector = HashMap<String, f64>;

/// Temperature comfort in `[0, 10]`, peaking at 24°C
#[must_use]
pub fn temperature_comfort(temperature_celsius: f64) -> f64 {
    (10.0 - (temperature_celsius - 24.0).abs() / 2.0).clamp(0.0, 10.0)
}

/// Engineered features for one city
#[must_use]
pub fn engineer_features(city: &CityRecord, signals: &CitySignals) -> FeatureVector {
    HashMap::from([
        (
            "Weather Quality".to_string(),
            f64::from(signals.weather.quality_score),
        ),
        (
            "Temperature".to_string(),
            signals.weather.temperature_celsius,
        ),
        (
            "Traffic Level".to_string(),
            f64::from(signals.traffic_level),
        ),
        (
            "Temp_Comfort".to_string(),
            temperature_comfort(signals.weather.temperature_celsius),
        ),
        (
            "Year_round".to_string(),
            if city.year_round { 1.0 } else { 0.0 },
        ),
        ("Ratings".to_string(), city.rating.unwrap_or(0.0)),
    ])
}

/// Opaque binary classifier scoring how recommendable a city is
pub trait ProbabilityModel: Send + Sync {
    /// Probability of the positive class for the given features
    ///
    /// Features the model expects but the vector lacks count as 0.
    fn predict_proba(&self, features: &FeatureVector) -> f64;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// Standard-scaled logistic regression exported to JSON
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogisticModel {
    pub features: Vec<String>,
    pub scaler: StandardScaler,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LogisticModel {
    /// Load a model export from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read model file {}", path.display()))?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let model: LogisticModel =
            serde_json::from_str(json).with_context(|| "Failed to parse model export")?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<()> {
        let n = self.features.len();
        if self.scaler.mean.len() != n || self.scaler.scale.len() != n || self.coefficients.len() != n
        {
            return Err(anyhow!(
                "Model export is inconsistent: {} features, {} means, {} scales, {} coefficients",
                n,
                self.scaler.mean.len(),
                self.scaler.scale.len(),
                self.coefficients.len()
            ));
        }
        Ok(())
    }
}

impl ProbabilityModel for LogisticModel {
    fn predict_proba(&self, features: &FeatureVector) -> f64 {
        let logit = self
            .features
            .iter()
            .zip(&self.scaler.mean)
            .zip(&self.scaler.scale)
            .zip(&self.coefficients)
            .map(|(((name, mean), scale), coefficient)| {
                let raw = features.get(name).copied().unwrap_or(0.0);
                // sklearn leaves zero-variance features unscaled
                let scale = if *scale == 0.0 { 1.0 } else { *scale };
                coefficient * (raw - mean) / scale
            })
            .sum::<f64>()
            + self.intercept;
        1.0 / (1.0 + (-logit).exp())
    }
}

/// A ranked destination
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DestinationRecommendation {
    pub city: String,
    pub weather_quality: u8,
    pub temperature_celsius: f64,
    pub traffic_level: u8,
    pub season_match: Option<bool>,
    /// Classifier probability, when a model was supplied
    pub recommendation_score: Option<f64>,
    pub final_score: f64,
}

/// Rank cities by final score and keep the best `top`
///
/// Cities without signals are scored with [`CitySignals::unavailable`].
/// When the preferences carry a season the weights are season-normalized.
#[must_use]
pub fn rank_destinations(
    cities: &[CityRecord],
    signals: &HashMap<String, CitySignals>,
    model: Option<&dyn ProbabilityModel>,
    preferences: &UserPreferences,
    top: usize,
) -> Vec<DestinationRecommendation> {
    let weights = WeightStrategy::for_preferences(preferences).apply(preferences);
    let fallback = CitySignals::unavailable();

    let mut ranked: Vec<DestinationRecommendation> = cities
        .iter()
        .map(|city| {
            let city_signals = signals.get(&city.city).unwrap_or(&fallback);
            let season_match = preferences
                .season
                .map(|season| season.matches(&city.best_time_to_visit));
            let recommendation_score =
                model.map(|m| m.predict_proba(&engineer_features(city, city_signals)));

            let season_term = match season_match {
                Some(true) => weights.season,
                _ => 0.0,
            };
            let final_score = 10.0
                * (weights.weather * f64::from(city_signals.weather.quality_score) / 10.0
                    + weights.crowd * (10.0 - f64::from(city_signals.traffic_level)) / 10.0
                    + weights.attractions * ATTRACTIONS_SCORE / 10.0
                    + season_term);

            DestinationRecommendation {
                city: city.city.clone(),
                weather_quality: city_signals.weather.quality_score,
                temperature_celsius: city_signals.weather.temperature_celsius,
                traffic_level: city_signals.traffic_level,
                season_match,
                recommendation_score,
                final_score,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(Ordering::Equal)
    });
    ranked.truncate(top);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Season, TripType, WeatherReading};

    const DATASET: &str = "\
City,Ratings,Ideal duration,Best Time to visit,City_desc
 Goa ,4.4,3-4 days,November to February (winter),Beaches
Manali,4.6,4 days,,Mountains
Goa,4.0,2 days,Summer,Duplicate
Jaipur,4.2,2 days,Throughout the year,Forts
";

    fn signals(condition: &str, temperature: f64, traffic_level: u8) -> CitySignals {
        CitySignals {
            weather: WeatherSnapshot::from_reading(WeatherReading {
                condition: condition.to_string(),
                temperature_celsius: temperature,
            }),
            traffic_level,
        }
    }

    #[test]
    fn test_parse_cities_cleans_rows() {
        let cities = parse_cities(DATASET.as_bytes()).unwrap();
        assert_eq!(cities.len(), 3);
        assert_eq!(cities[0].city, "Goa");
        assert_eq!(cities[0].rating, Some(4.4));
        assert!(!cities[0].year_round);
        assert_eq!(cities[1].best_time_to_visit, YEAR_ROUND);
        assert!(cities[1].year_round);
        assert!(cities[2].year_round);
    }

    #[test]
    fn test_temperature_comfort() {
        assert_eq!(temperature_comfort(24.0), 10.0);
        assert_eq!(temperature_comfort(30.0), 7.0);
        assert_eq!(temperature_comfort(60.0), 0.0);
    }

    #[test]
    fn test_city_traffic_level() {
        assert_eq!(CitySignals::traffic_level_for(4), 1);
        assert_eq!(CitySignals::traffic_level_for(45), 4);
        assert_eq!(CitySignals::traffic_level_for(600), 10);
    }

    #[test]
    fn test_rank_without_season() {
        let cities = parse_cities(DATASET.as_bytes()).unwrap();
        let signals = HashMap::from([
            ("Goa".to_string(), signals("clear sky", 28.0, 2)),
            ("Manali".to_string(), signals("light snow", 2.0, 8)),
        ]);
        let preferences = UserPreferences::new(0.3, 0.3, 0.2, TripType::Adventure);

        let ranked = rank_destinations(&cities, &signals, None, &preferences, 5);

        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].city, "Goa");
        // 10 * (0.3 * 10/10 + 0.3 * 8/10 + 0.2 * 0.5) = 6.4
        assert!((ranked[0].final_score - 6.4).abs() < 1e-9);
        // Jaipur has no signals: quality 5, traffic 5 -> 10 * (0.15 + 0.15 + 0.1) = 4.0
        assert_eq!(ranked[1].city, "Jaipur");
        assert!((ranked[1].final_score - 4.0).abs() < 1e-9);
        assert!(ranked.iter().all(|r| r.season_match.is_none()));
    }

    #[test]
    fn test_rank_with_season_normalizes_and_rewards_match() {
        let cities = parse_cities(DATASET.as_bytes()).unwrap();
        let signals = HashMap::from([
            ("Goa".to_string(), signals("mist", 15.0, 5)),
            ("Manali".to_string(), signals("mist", 15.0, 5)),
            ("Jaipur".to_string(), signals("mist", 15.0, 5)),
        ]);
        let preferences =
            UserPreferences::new(0.3, 0.3, 0.2, TripType::Adventure).with_season(Season::Winter);

        let ranked = rank_destinations(&cities, &signals, None, &preferences, 2);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].city, "Goa");
        assert_eq!(ranked[0].season_match, Some(true));
        // weights sum to 0.8: 10 * (0.3*0.6 + 0.3*0.5 + 0.2*0.5 + 0.2) = 6.3
        assert!((ranked[0].final_score - 6.3).abs() < 1e-9);
        assert!((ranked[1].final_score - 4.3).abs() < 1e-9);
    }

    #[test]
    fn test_logistic_model_predicts_probability() {
        let model = LogisticModel::from_json(
            r#"{
                "features": ["Weather Quality", "Traffic Level", "Unknown"],
                "scaler": {"mean": [5.0, 5.0, 0.0], "scale": [2.0, 0.0, 1.0]},
                "coefficients": [1.0, -0.5, 3.0],
                "intercept": 0.0
            }"#,
        )
        .unwrap();
        let city = CityRecord {
            city: "Goa".to_string(),
            rating: None,
            best_time_to_visit: YEAR_ROUND.to_string(),
            year_round: true,
        };

        let features = engineer_features(&city, &signals("mist", 15.0, 5));
        // quality 6: (6-5)/2 = 0.5, traffic (5-5)/1 = 0, unknown feature 0
        let p = model.predict_proba(&features);
        let expected = 1.0 / (1.0 + (-0.5f64).exp());
        assert!((p - expected).abs() < 1e-12);

        let cities = vec![city];
        let ranked = rank_destinations(
            &cities,
            &HashMap::new(),
            Some(&model),
            &UserPreferences::default(),
            1,
        );
        assert!(ranked[0].recommendation_score.is_some());
    }

    #[test]
    fn test_logistic_model_rejects_inconsistent_export() {
        let result = LogisticModel::from_json(
            r#"{"features": ["a"], "scaler": {"mean": [], "scale": [1.0]}, "coefficients": [1.0], "intercept": 0.0}"#,
        );
        assert!(result.is_err());
    }
}
