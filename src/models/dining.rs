//! Restaurant recommendations along the route

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Restaurant price tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceLevel {
    Budget,
    #[default]
    Moderate,
    Expensive,
}

impl PriceLevel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PriceLevel::Budget => "budget",
            PriceLevel::Moderate => "moderate",
            PriceLevel::Expensive => "expensive",
        }
    }

    /// Typical spend per person per day of eating out
    #[must_use]
    pub fn daily_cost_per_person(self) -> f64 {
        match self {
            PriceLevel::Budget => 35.0,
            PriceLevel::Moderate => 60.0,
            PriceLevel::Expensive => 110.0,
        }
    }
}

impl std::str::FromStr for PriceLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "budget" | "cheap" | "low" => Ok(PriceLevel::Budget),
            "moderate" | "mid" | "mid-range" | "medium" => Ok(PriceLevel::Moderate),
            "expensive" | "luxury" | "high" => Ok(PriceLevel::Expensive),
            other => Err(format!("unknown price level '{other}'")),
        }
    }
}

impl std::fmt::Display for PriceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub name: String,
    #[serde(default)]
    pub location: String,
    pub cuisine: String,
    pub price_level: PriceLevel,
    pub rating: f32,
    #[serde(default)]
    pub signature_items: Vec<String>,
    /// Whether a table can be reserved
    #[serde(default)]
    pub availability: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub available_times: Vec<String>,
}

/// Restaurants recommended for one stop of the route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationDining {
    pub location: String,
    pub restaurants: Vec<Restaurant>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiningRecommendations {
    #[serde(default)]
    pub locations: Vec<LocationDining>,
    /// Model reply the recommendations were derived from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_reply: Option<String>,
}

impl DiningRecommendations {
    #[must_use]
    pub fn new(locations: Vec<LocationDining>) -> Self {
        Self {
            locations,
            raw_reply: None,
        }
    }

    #[must_use]
    pub fn for_location(&self, location: &str) -> Option<&LocationDining> {
        self.locations
            .iter()
            .find(|l| l.location.eq_ignore_ascii_case(location))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.iter().all(|l| l.restaurants.is_empty())
    }
}

/// Input to the dining stage
#[derive(Debug, Clone, PartialEq)]
pub struct DiningQuery {
    /// Stops produced by the route stage
    pub locations: Vec<String>,
    pub cuisine_preferences: Vec<String>,
    pub price_level: PriceLevel,
    pub travel_dates: Vec<NaiveDate>,
}

/// Search response of the restaurant backend
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestaurantSearchResponse {
    pub results: Vec<Restaurant>,
}
