//! Daily weather forecast model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One forecast day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    /// Short condition label, e.g. "Sunny" or "Thunderstorm"
    pub condition: String,
    #[serde(default)]
    pub description: String,
    pub high_temp_f: i32,
    pub low_temp_f: i32,
    /// Chance of precipitation, 0-100
    pub precipitation_chance: u8,
}

impl DailyForecast {
    /// Placeholder day used when no real forecast is available
    #[must_use]
    pub fn typical(date: NaiveDate) -> Self {
        Self {
            date,
            condition: "Partly Cloudy".to_string(),
            description: "Typical conditions for the season".to_string(),
            high_temp_f: 75,
            low_temp_f: 45,
            precipitation_chance: 20,
        }
    }

    /// Format temperature range with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{}°F / {}°F", self.high_temp_f, self.low_temp_f)
    }
}

/// Forecast for a location over a date range
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherForecast {
    #[serde(default)]
    pub location: String,
    /// Ordered by date ascending, one entry per day
    #[serde(default)]
    pub forecasts: Vec<DailyForecast>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advisory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
    /// Model reply the forecast was derived from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_reply: Option<String>,
}

impl WeatherForecast {
    #[must_use]
    pub fn new(location: impl Into<String>, forecasts: Vec<DailyForecast>) -> Self {
        Self {
            location: location.into(),
            forecasts,
            advisory: None,
            data_source: None,
            raw_reply: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.data_source = Some(source.into());
        self
    }

    /// Forecast for a specific date
    #[must_use]
    pub fn day(&self, date: NaiveDate) -> Option<&DailyForecast> {
        self.forecasts.iter().find(|day| day.date == date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape_without_optional_fields() {
        let json = r#"{"location": "Yellowstone", "forecasts": [{"date": "2025-06-03", "condition": "Rain", "high_temp_f": 60, "low_temp_f": 38, "precipitation_chance": 80}]}"#;
        let forecast: WeatherForecast = serde_json::from_str(json).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 6, 3).unwrap();
        assert_eq!(forecast.day(date).unwrap().condition, "Rain");
        assert!(forecast.day(date).unwrap().description.is_empty());
    }
}
