//! Lodging search results and trip cost estimates

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotel {
    pub name: String,
    pub location: String,
    /// Nightly rate in USD
    pub price: f64,
    pub rating: f32,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub availability: bool,
}

impl Hotel {
    #[must_use]
    pub fn has_amenities(&self, required: &[String]) -> bool {
        required.iter().all(|wanted| {
            self.amenities
                .iter()
                .any(|amenity| amenity.eq_ignore_ascii_case(wanted))
        })
    }
}

/// Search response of the hotel backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HotelSearchResponse {
    pub results: Vec<Hotel>,
    /// Model reply the results were derived from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_reply: Option<String>,
}

impl HotelSearchResponse {
    #[must_use]
    pub fn new(results: Vec<Hotel>) -> Self {
        Self {
            results,
            raw_reply: None,
        }
    }
}

/// Input to the hotel stage
#[derive(Debug, Clone, PartialEq)]
pub struct HotelQuery {
    pub location: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub max_price: Option<f64>,
    pub amenities: Vec<String>,
}

impl HotelQuery {
    #[must_use]
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days().max(1)
    }
}

/// Lodging class used when picking a representative nightly rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotelClass {
    Budget,
    MidRange,
    Luxury,
}

/// Estimated trip costs in USD
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EstimatedCosts {
    pub lodging_usd: f64,
    pub dining_usd: f64,
    pub fuel_usd: f64,
    pub total_usd: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_usd: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub within_budget: Option<bool>,
}
