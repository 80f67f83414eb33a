//! User preference weights that steer the scorer

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Importance given to the season match when a season is selected
pub const SEASON_IMPORTANCE: f64 = 0.2;

/// Kind of trip the traveller is planning
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum TripType {
    #[default]
    Adventure,
    Relaxation,
    Cultural,
}

impl TripType {
    /// Multiplier applied to the crowd term (Adventure) or the attractions
    /// term (Cultural)
    #[must_use]
    pub const fn multiplier(self) -> f64 {
        match self {
            TripType::Adventure => 1.2,
            TripType::Relaxation => 0.8,
            TripType::Cultural => 1.5,
        }
    }

    /// Factor for the crowd term: the multiplier for Adventure trips, else 1
    #[must_use]
    pub const fn crowd_factor(self) -> f64 {
        match self {
            TripType::Adventure => self.multiplier(),
            _ => 1.0,
        }
    }

    /// Factor for the attractions term: the multiplier for Cultural trips, else 1
    #[must_use]
    pub const fn attractions_factor(self) -> f64 {
        match self {
            TripType::Cultural => self.multiplier(),
            _ => 1.0,
        }
    }
}

impl fmt::Display for TripType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TripType::Adventure => "Adventure",
            TripType::Relaxation => "Relaxation",
            TripType::Cultural => "Cultural",
        };
        f.write_str(name)
    }
}

impl FromStr for TripType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "adventure" => Ok(TripType::Adventure),
            "relaxation" => Ok(TripType::Relaxation),
            "cultural" => Ok(TripType::Cultural),
            other => Err(format!(
                "unknown trip type '{other}'. Must be one of: adventure, relaxation, cultural"
            )),
        }
    }
}

/// Preferred travel season
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Summer,
    Winter,
    Spring,
    Fall,
}

impl Season {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Season::Summer => "Summer",
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Fall => "Fall",
        }
    }

    /// Case-insensitive containment in a free-text "best time to visit"
    #[must_use]
    pub fn matches(self, best_time_to_visit: &str) -> bool {
        best_time_to_visit
            .to_lowercase()
            .contains(&self.name().to_lowercase())
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Season {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "summer" => Ok(Season::Summer),
            "winter" => Ok(Season::Winter),
            "spring" => Ok(Season::Spring),
            "fall" | "autumn" => Ok(Season::Fall),
            other => Err(format!(
                "unknown season '{other}'. Must be one of: summer, winter, spring, fall"
            )),
        }
    }
}

/// Scoring weights chosen by the user
///
/// Each weight is expected in `[0, 1]`; they are not required to sum to 1
/// and are used as given unless a [`WeightStrategy`] says otherwise.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UserPreferences {
    #[serde(default = "default_weather_importance", alias = "weather")]
    pub weather_importance: f64,
    #[serde(default = "default_crowd_importance", alias = "crowd")]
    pub crowd_importance: f64,
    #[serde(default = "default_attractions_importance", alias = "attractions")]
    pub attractions_importance: f64,
    #[serde(default)]
    pub trip_type: TripType,
    #[serde(default)]
    pub season: Option<Season>,
}

fn default_weather_importance() -> f64 {
    0.3
}

fn default_crowd_importance() -> f64 {
    0.3
}

fn default_attractions_importance() -> f64 {
    0.2
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            weather_importance: default_weather_importance(),
            crowd_importance: default_crowd_importance(),
            attractions_importance: default_attractions_importance(),
            trip_type: TripType::default(),
            season: None,
        }
    }
}

impl UserPreferences {
    #[must_use]
    pub fn new(weather: f64, crowd: f64, attractions: f64, trip_type: TripType) -> Self {
        Self {
            weather_importance: weather,
            crowd_importance: crowd,
            attractions_importance: attractions,
            trip_type,
            season: None,
        }
    }

    #[must_use]
    pub fn with_season(mut self, season: Season) -> Self {
        self.season = Some(season);
        self
    }

    /// Names of the weights that fall outside `[0, 1]`
    #[must_use]
    pub fn out_of_range_weights(&self) -> Vec<&'static str> {
        [
            ("weather_importance", self.weather_importance),
            ("crowd_importance", self.crowd_importance),
            ("attractions_importance", self.attractions_importance),
        ]
        .into_iter()
        .filter(|(_, weight)| !(0.0..=1.0).contains(weight))
        .map(|(name, _)| name)
        .collect()
    }
}

/// How raw preference weights are turned into scoring weights
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub enum WeightStrategy {
    /// Weights are used exactly as given
    #[default]
    AsGiven,
    /// Weights are rescaled so they sum to `1 - season_importance`, leaving
    /// room for a season-match term
    SeasonNormalized { season_importance: f64 },
}

/// Effective weights after applying a [`WeightStrategy`]
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub weather: f64,
    pub crowd: f64,
    pub attractions: f64,
    /// Zero unless season normalization is in effect
    pub season: f64,
}

impl WeightStrategy {
    /// Season normalization when the user picked a season, else as given
    #[must_use]
    pub fn for_preferences(preferences: &UserPreferences) -> Self {
        if preferences.season.is_some() {
            WeightStrategy::SeasonNormalized {
                season_importance: SEASON_IMPORTANCE,
            }
        } else {
            WeightStrategy::AsGiven
        }
    }

    #[must_use]
    pub fn apply(self, preferences: &UserPreferences) -> ScoringWeights {
        let weather = preferences.weather_importance;
        let crowd = preferences.crowd_importance;
        let attractions = preferences.attractions_importance;

        match self {
            WeightStrategy::AsGiven => ScoringWeights {
                weather,
                crowd,
                attractions,
                season: 0.0,
            },
            WeightStrategy::SeasonNormalized { season_importance } => {
                let total = weather + crowd + attractions;
                // all-zero weights stay zero rather than dividing by zero
                let factor = if total > 0.0 {
                    (1.0 - season_importance) / total
                } else {
                    0.0
                };
                ScoringWeights {
                    weather: weather * factor,
                    crowd: crowd * factor,
                    attractions: attractions * factor,
                    season: season_importance,
                }
            }
        }
    }
}
