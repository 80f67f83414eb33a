//! Candidate points of interest returned by a places search

use serde::{Deserialize, Deserializer, Serialize};

use super::location::Coordinates;

/// Rating assumed for places the search returned without one
pub const DEFAULT_RATING: f64 = 3.0;

/// Marker some sources use instead of a numeric rating
pub const UNRATED: &str = "N/A";

/// Accepts a number, `null`, a numeric string or [`UNRATED`]
///
/// Binary formats such as the cache's postcard entries carry the plain
/// `Option<f64>`.
fn deserialize_rating<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    if !deserializer.is_human_readable() {
        return Option::<f64>::deserialize(deserializer);
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(rating)) => Ok(Some(rating)),
        Some(Raw::Text(text)) => {
            let text = text.trim();
            if text.eq_ignore_ascii_case(UNRATED) || text.is_empty() {
                Ok(None)
            } else {
                text.parse().map(Some).map_err(|_| {
                    serde::de::Error::custom(format!(
                        "invalid rating '{text}', expected a number or \"{UNRATED}\""
                    ))
                })
            }
        }
    }
}

/// A candidate point of interest
///
/// Built fresh from every places-search response and never mutated.
/// `name` is the key used to join a place with its traffic sample.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Place {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    /// Average user rating in `[1, 5]`; `None` when the place is unrated
    #[serde(default, deserialize_with = "deserialize_rating")]
    pub rating: Option<f64>,
    /// Free-text type tags in the order the search returned them
    #[serde(default, alias = "types")]
    pub category_hints: Vec<String>,
}

impl Place {
    #[must_use]
    pub fn new(name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lng,
            rating: None,
            category_hints: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    #[must_use]
    pub fn with_hints<I, S>(mut self, hints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.category_hints = hints.into_iter().map(Into::into).collect();
        self
    }

    /// Rating used for scoring: unrated places count as [`DEFAULT_RATING`]
    #[must_use]
    pub fn rating_or_default(&self) -> f64 {
        self.rating.unwrap_or(DEFAULT_RATING)
    }

    #[must_use]
    pub const fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }
}
