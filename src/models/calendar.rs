//! Candidate travel date ranges and their scores

use chrono::{Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Weight of the weather score in the composite score
pub const WEATHER_WEIGHT: f64 = 0.4;
/// Weight of the crowd score in the composite score
pub const CROWD_WEIGHT: f64 = 0.4;
/// Weight of the wildlife score in the composite score
pub const WILDLIFE_WEIGHT: f64 = 0.2;

/// A contiguous, inclusive range of travel days with desirability scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Composite score in [0, 1]
    #[serde(default)]
    pub total_score: f64,
    #[serde(default)]
    pub weather_score: f64,
    /// Higher means less crowded
    #[serde(default)]
    pub crowd_score: f64,
    #[serde(default)]
    pub wildlife_score: f64,
}

impl DateRange {
    /// Create an unscored range covering `duration_days` days from `start_date`
    #[must_use]
    pub fn unscored(start_date: NaiveDate, duration_days: u32) -> Self {
        Self {
            start_date,
            end_date: start_date + Duration::days(i64::from(duration_days.max(1)) - 1),
            total_score: 0.0,
            weather_score: 0.0,
            crowd_score: 0.0,
            wildlife_score: 0.0,
        }
    }

    /// Create a scored range; component scores are rounded to two decimals and
    /// the composite is derived from the rounded components.
    #[must_use]
    pub fn scored(
        start_date: NaiveDate,
        duration_days: u32,
        weather_score: f64,
        crowd_score: f64,
        wildlife_score: f64,
    ) -> Self {
        let weather_score = round2(weather_score);
        let crowd_score = round2(crowd_score);
        let wildlife_score = round2(wildlife_score);
        Self {
            total_score: round2(composite_score(weather_score, crowd_score, wildlife_score)),
            weather_score,
            crowd_score,
            wildlife_score,
            ..Self::unscored(start_date, duration_days)
        }
    }

    /// Number of days in the range, inclusive
    #[must_use]
    pub fn num_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    /// All dates in the range, ascending
    #[must_use]
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.start_date
            .iter_days()
            .take_while(|date| *date <= self.end_date)
            .collect()
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

/// Composite desirability score
#[must_use]
pub fn composite_score(weather: f64, crowd: f64, wildlife: f64) -> f64 {
    WEATHER_WEIGHT * weather + CROWD_WEIGHT * crowd + WILDLIFE_WEIGHT * wildlife
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Input to the calendar stage
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarQuery {
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub duration_days: u32,
    pub preferred_start_day: Option<Weekday>,
}

/// Output of the calendar stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateRecommendations {
    /// Best first, at most three entries
    #[serde(default, alias = "recommended_date_ranges")]
    pub date_ranges: Vec<DateRange>,
    #[serde(default)]
    pub reasoning: String,
    /// Set when the stage fell back to a default range
    #[serde(default)]
    pub degraded: bool,
}

impl DateRecommendations {
    /// Reasoning used when no structured ranges were available
    pub const UNAVAILABLE_REASONING: &'static str =
        "Unable to extract structured date recommendations.";

    #[must_use]
    pub fn best(&self) -> Option<&DateRange> {
        self.date_ranges.first()
    }

    /// Reasoning-only fallback
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            date_ranges: Vec::new(),
            reasoning: Self::UNAVAILABLE_REASONING.to_string(),
            degraded: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_unscored_range_covers_duration() {
        let range = DateRange::unscored(date("2025-06-01"), 4);
        assert_eq!(range.end_date, date("2025-06-04"));
        assert_eq!(range.num_days(), 4);
        assert_eq!(range.dates().len(), 4);
    }

    #[test]
    fn test_scored_range_uses_weights() {
        let range = DateRange::scored(date("2025-07-10"), 3, 0.9, 0.3, 0.6);
        assert_eq!(range.total_score, 0.6);
        assert!((range.total_score - composite_score(0.9, 0.3, 0.6)).abs() < 0.01);
    }

    #[test]
    fn test_recommendations_accept_tool_field_name() {
        let json = r#"{"recommended_date_ranges": [{"start_date": "2025-06-02", "end_date": "2025-06-05"}], "reasoning": "dry week"}"#;
        let recs: DateRecommendations = serde_json::from_str(json).unwrap();
        assert_eq!(recs.best().unwrap().start_date, date("2025-06-02"));
        assert!(!recs.degraded);
    }
}
