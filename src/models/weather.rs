//! Weather data model, quality derivation and display methods

use serde::{Deserialize, Serialize};

/// Condition text used when the weather service could not be reached
pub const UNKNOWN_CONDITION: &str = "unknown";
/// Temperature assumed when the weather service could not be reached
pub const DEFAULT_TEMPERATURE_CELSIUS: f64 = 25.0;
/// Quality assumed when the weather service could not be reached
pub const DEFAULT_QUALITY: u8 = 5;

/// Raw conditions as reported by a weather collaborator
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherReading {
    /// Free-text description, e.g. "few clouds"
    pub condition: String,
    pub temperature_celsius: f64,
}

/// Destination weather at request time
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherSnapshot {
    pub condition: String,
    pub temperature_celsius: f64,
    /// Desirability in `1..=10`
    pub quality_score: u8,
}

impl WeatherSnapshot {
    /// Build a snapshot, deriving the quality score from the reading
    #[must_use]
    pub fn from_reading(reading: WeatherReading) -> Self {
        let quality_score = quality_score(&reading.condition, reading.temperature_celsius);
        Self {
            condition: reading.condition,
            temperature_celsius: reading.temperature_celsius,
            quality_score,
        }
    }

    /// Degraded snapshot substituted when the weather lookup failed
    ///
    /// The quality is the fixed default, not derived from the condition.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            condition: UNKNOWN_CONDITION.to_string(),
            temperature_celsius: DEFAULT_TEMPERATURE_CELSIUS,
            quality_score: DEFAULT_QUALITY,
        }
    }

    #[must_use]
    pub fn is_outdoor_friendly(&self) -> bool {
        is_outdoor_friendly(&self.condition)
    }

    /// Short symbol for the headline of a plan
    #[must_use]
    pub fn icon(&self) -> &'static str {
        let condition = self.condition.as_str();
        if condition.contains("clear") || condition.contains("sunny") {
            "☀️"
        } else if condition.contains("cloud") {
            "☁️"
        } else if condition.contains("rain") {
            "🌧️"
        } else {
            "❓"
        }
    }

    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{:.1}°C", self.temperature_celsius)
    }

    /// Condition with the first letter capitalized
    #[must_use]
    pub fn format_description(&self) -> String {
        let mut chars = self.condition.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// Derive the 1-10 quality score from condition text and temperature
///
/// Base quality is 9 for clear or sunny skies, 7 for clouds, 4 for rain and
/// 6 otherwise. Temperatures in `[20, 30]` add one point, below 5 or above
/// 40 remove two. Matching is case-sensitive on the raw description.
#[must_use]
pub fn quality_score(condition: &str, temperature_celsius: f64) -> u8 {
    let base: i32 = if condition.contains("clear") || condition.contains("sunny") {
        9
    } else if condition.contains("cloud") {
        7
    } else if condition.contains("rain") {
        4
    } else {
        6
    };

    let adjustment = if (20.0..=30.0).contains(&temperature_celsius) {
        1
    } else if temperature_celsius < 5.0 || temperature_celsius > 40.0 {
        -2
    } else {
        0
    };

    // clamped to 1..=10, so the cast cannot truncate
    (base + adjustment).clamp(1, 10) as u8
}

/// True iff the condition mentions "clear", "sunny" or "few clouds"
#[must_use]
pub fn is_outdoor_friendly(condition: &str) -> bool {
    condition.contains("clear") || condition.contains("sunny") || condition.contains("few clouds")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("clear sky", 25.0, 10)]
    #[case("rain", 2.0, 2)]
    #[case("light rain", 15.0, 4)]
    #[case("broken clouds", 22.0, 8)]
    #[case("sunny", 45.0, 7)]
    #[case("mist", 10.0, 6)]
    #[case("haze", 30.0, 7)]
    #[case("heavy intensity rain", -3.0, 2)]
    #[case("Clear sky", 12.0, 6)]
    fn test_quality_score(#[case] condition: &str, #[case] temperature: f64, #[case] expected: u8) {
        assert_eq!(quality_score(condition, temperature), expected);
    }

    #[test]
    fn test_quality_score_boundaries_are_inclusive() {
        assert_eq!(quality_score("mist", 20.0), 7);
        assert_eq!(quality_score("mist", 30.0), 7);
        assert_eq!(quality_score("mist", 5.0), 6);
        assert_eq!(quality_score("mist", 40.0), 6);
        assert_eq!(quality_score("mist", 4.9), 4);
    }

    #[rstest]
    #[case("clear sky", true)]
    #[case("sunny", true)]
    #[case("few clouds", true)]
    #[case("scattered clouds", false)]
    #[case("light rain", false)]
    #[case("Clear sky", false)]
    fn test_outdoor_friendly(#[case] condition: &str, #[case] expected: bool) {
        assert_eq!(is_outdoor_friendly(condition), expected);
    }

    #[test]
    fn test_unavailable_uses_fixed_defaults() {
        let snapshot = WeatherSnapshot::unavailable();
        assert_eq!(snapshot.condition, "unknown");
        assert_eq!(snapshot.temperature_celsius, 25.0);
        assert_eq!(snapshot.quality_score, 5);
        assert!(!snapshot.is_outdoor_friendly());
    }

    #[test]
    fn test_from_reading_derives_quality() {
        let snapshot = WeatherSnapshot::from_reading(WeatherReading {
            condition: "few clouds".to_string(),
            temperature_celsius: 27.5,
        });
        assert_eq!(snapshot.quality_score, 8);
        assert!(snapshot.is_outdoor_friendly());
        assert_eq!(snapshot.icon(), "☁️");
        assert_eq!(snapshot.format_description(), "Few clouds");
        assert_eq!(snapshot.format_temperature(), "27.5°C");
    }
}
