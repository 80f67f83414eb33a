//! Place categories derived from search type tags

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse category used to pick a time of day for a visit
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum PlaceCategory {
    Outdoor,
    Indoor,
    Dining,
    Mixed,
    /// Far-away places in the time-of-day layout
    IndoorOrDining,
}

impl PlaceCategory {
    /// Category for a single type tag, if the tag is known
    #[must_use]
    pub fn for_tag(tag: &str) -> Option<Self> {
        let category = match tag {
            "park" | "amusement_park" | "zoo" => PlaceCategory::Outdoor,
            "museum" | "art_gallery" | "shopping_mall" => PlaceCategory::Indoor,
            "restaurant" | "cafe" | "bar" => PlaceCategory::Dining,
            "point_of_interest" | "establishment" => PlaceCategory::Mixed,
            _ => return None,
        };
        Some(category)
    }

    /// Category of the first known tag, `Mixed` when none is known
    #[must_use]
    pub fn from_tags<S: AsRef<str>>(tags: &[S]) -> Self {
        tags.iter()
            .find_map(|tag| Self::for_tag(tag.as_ref()))
            .unwrap_or(PlaceCategory::Mixed)
    }
}

impl fmt::Display for PlaceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PlaceCategory::Outdoor => "Outdoor",
            PlaceCategory::Indoor => "Indoor",
            PlaceCategory::Dining => "Dining",
            PlaceCategory::Mixed => "Mixed",
            PlaceCategory::IndoorOrDining => "Indoor or dining",
        };
        f.write_str(label)
    }
}
