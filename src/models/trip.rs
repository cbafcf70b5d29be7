//! Trip request, preferences and the assembled trip plan

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{
    DailyForecast, DateRange, DateRecommendations, EstimatedCosts, Hotel, LocationDining,
    PriceLevel, RoutePlan,
};
use crate::PlannerError;

/// Shortest trip the planner accepts, in days
pub const MIN_TRIP_DAYS: u32 = 1;
/// Longest trip the planner accepts, in days
pub const MAX_TRIP_DAYS: u32 = 14;

/// Body of `POST /api/plan-trip`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRequest {
    pub starting_location: String,
    #[serde(deserialize_with = "lenient_date")]
    pub travel_window_start: NaiveDate,
    #[serde(deserialize_with = "lenient_date")]
    pub travel_window_end: NaiveDate,
    pub trip_duration_days: u32,
    #[serde(default)]
    pub preferences: Option<HashMap<String, Value>>,
    /// Budget limit for the trip in USD
    #[serde(default)]
    pub budget: Option<f64>,
}

impl TripRequest {
    /// Check the request before any agent runs
    pub fn validate(&self) -> crate::Result<()> {
        if self.starting_location.trim().is_empty() {
            return Err(PlannerError::validation("starting_location must not be empty"));
        }

        if !(MIN_TRIP_DAYS..=MAX_TRIP_DAYS).contains(&self.trip_duration_days) {
            return Err(PlannerError::validation(format!(
                "trip_duration_days must be between {MIN_TRIP_DAYS} and {MAX_TRIP_DAYS}, got {}",
                self.trip_duration_days
            )));
        }

        if self.travel_window_start > self.travel_window_end {
            return Err(PlannerError::validation(format!(
                "travel_window_start {} is after travel_window_end {}",
                self.travel_window_start, self.travel_window_end
            )));
        }

        let window_days = self.window_days();
        if i64::from(self.trip_duration_days) > window_days {
            return Err(PlannerError::validation(format!(
                "a {}-day trip does not fit in a travel window of {window_days} days",
                self.trip_duration_days
            )));
        }

        if let Some(budget) = self.budget {
            if !budget.is_finite() || budget < 0.0 {
                return Err(PlannerError::validation("budget must be a non-negative number"));
            }
        }

        Ok(())
    }

    /// Days between window start and end
    #[must_use]
    pub fn window_days(&self) -> i64 {
        (self.travel_window_end - self.travel_window_start).num_days()
    }

    #[must_use]
    pub fn preferences(&self) -> TripPreferences {
        self.preferences
            .as_ref()
            .map(TripPreferences::from_map)
            .unwrap_or_default()
    }
}

/// Accept `YYYY-MM-DD` as well as ISO-8601 datetimes, dropping the time part
fn lenient_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_lenient_date(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!("invalid date '{raw}', expected YYYY-MM-DD"))
    })
}

pub(crate) fn parse_lenient_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
}

/// Typed view over the open preference map
#[derive(Debug, Clone, PartialEq)]
pub struct TripPreferences {
    pub dining_budget: PriceLevel,
    pub preferred_cuisines: Vec<String>,
    pub preferred_start_day: Option<Weekday>,
    pub waypoints: Vec<String>,
    pub party_size: u32,
    pub hotel_amenities: Vec<String>,
    pub max_hotel_price: Option<f64>,
    pub accessibility_needs: bool,
    pub hiking_interest: bool,
}

impl Default for TripPreferences {
    fn default() -> Self {
        Self {
            dining_budget: PriceLevel::Moderate,
            preferred_cuisines: vec!["American".to_string(), "Italian".to_string()],
            preferred_start_day: None,
            waypoints: Vec::new(),
            party_size: 2,
            hotel_amenities: Vec::new(),
            max_hotel_price: None,
            accessibility_needs: false,
            hiking_interest: true,
        }
    }
}

impl TripPreferences {
    /// Read known keys leniently; anything missing or malformed keeps its default
    #[must_use]
    pub fn from_map(map: &HashMap<String, Value>) -> Self {
        let mut prefs = Self::default();

        if let Some(level) = map
            .get("dining_budget")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
        {
            prefs.dining_budget = level;
        }
        if let Some(cuisines) = map.get("preferred_cuisines").and_then(string_list) {
            prefs.preferred_cuisines = cuisines;
        }
        prefs.preferred_start_day = map
            .get("preferred_start_day")
            .or_else(|| map.get("preferred_day_of_week_start"))
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<Weekday>().ok());
        if let Some(waypoints) = map.get("waypoints").and_then(string_list) {
            prefs.waypoints = waypoints;
        }
        if let Some(size) = map
            .get("party_size")
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| *n > 0)
        {
            prefs.party_size = size;
        }
        if let Some(amenities) = map.get("hotel_amenities").and_then(string_list) {
            prefs.hotel_amenities = amenities;
        }
        prefs.max_hotel_price = map.get("max_hotel_price").and_then(Value::as_f64);
        if let Some(flag) = map.get("accessibility_needs").and_then(Value::as_bool) {
            prefs.accessibility_needs = flag;
        }
        if let Some(flag) = map.get("hiking_interest").and_then(Value::as_bool) {
            prefs.hiking_interest = flag;
        }

        prefs
    }
}

/// Accepts a JSON list of strings or a single comma separated string
fn string_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        Value::String(s) => Some(
            s.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        _ => None,
    }
}

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStage {
    Dates,
    Weather,
    Route,
    Dining,
    Hotels,
    Aggregation,
}

impl PlanStage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PlanStage::Dates => "dates",
            PlanStage::Weather => "weather",
            PlanStage::Route => "route",
            PlanStage::Dining => "dining",
            PlanStage::Hotels => "hotels",
            PlanStage::Aggregation => "aggregation",
        }
    }
}

impl std::fmt::Display for PlanStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Completed,
    Degraded,
    Skipped,
}

/// What happened to one stage of a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: PlanStage,
    pub status: StageStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl StageReport {
    #[must_use]
    pub fn completed(stage: PlanStage) -> Self {
        Self {
            stage,
            status: StageStatus::Completed,
            reason: None,
        }
    }

    #[must_use]
    pub fn degraded(stage: PlanStage, reason: impl Into<String>) -> Self {
        Self {
            stage,
            status: StageStatus::Degraded,
            reason: Some(reason.into()),
        }
    }

    #[must_use]
    pub fn skipped(stage: PlanStage, reason: impl Into<String>) -> Self {
        Self {
            stage,
            status: StageStatus::Skipped,
            reason: Some(reason.into()),
        }
    }
}

/// The composite plan returned to the caller. Every section is present;
/// failed sections hold explicit empty values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripPlan {
    pub starting_location: String,
    pub duration_days: u32,
    pub recommended_dates: DateRecommendations,
    /// The range the rest of the plan was built for
    pub selected_dates: DateRange,
    pub weather_forecast: Vec<DailyForecast>,
    pub route_plan: RoutePlan,
    pub dining_recommendations: Vec<LocationDining>,
    pub hotel_recommendations: Vec<Hotel>,
    pub estimated_costs: EstimatedCosts,
    pub raw_plan: String,
    pub stage_reports: Vec<StageReport>,
}

impl TripPlan {
    #[must_use]
    pub fn report(&self, stage: PlanStage) -> Option<&StageReport> {
        self.stage_reports.iter().find(|r| r.stage == stage)
    }

    /// Whether any stage fell back to defaults
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.stage_reports
            .iter()
            .any(|r| r.status == StageStatus::Degraded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn request(start: &str, end: &str, days: u32) -> TripRequest {
        serde_json::from_value(json!({
            "starting_location": "Denver",
            "travel_window_start": start,
            "travel_window_end": end,
            "trip_duration_days": days,
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_request() {
        assert!(request("2025-06-01", "2025-06-30", 4).validate().is_ok());
    }

    #[rstest]
    #[case("2025-06-01", "2025-06-30", 0)]
    #[case("2025-06-01", "2025-06-30", 15)]
    #[case("2025-06-10", "2025-06-01", 3)]
    #[case("2025-06-01", "2025-06-03", 3)]
    fn test_invalid_requests(#[case] start: &str, #[case] end: &str, #[case] days: u32) {
        let err = request(start, end, days).validate().unwrap_err();
        assert!(matches!(err, PlannerError::Validation { .. }));
    }

    #[test]
    fn test_negative_budget_rejected() {
        let mut req = request("2025-06-01", "2025-06-30", 4);
        req.budget = Some(-10.0);
        assert!(req.validate().is_err());
    }

    #[rstest]
    #[case("2025-06-01")]
    #[case("2025-06-01T00:00:00")]
    #[case("2025-06-01T08:30:00Z")]
    #[case("2025-06-01T08:30:00.000+02:00")]
    fn test_lenient_dates(#[case] raw: &str) {
        assert_eq!(
            parse_lenient_date(raw),
            NaiveDate::from_ymd_opt(2025, 6, 1)
        );
    }

    #[test]
    fn test_malformed_date_rejected() {
        let result: Result<TripRequest, _> = serde_json::from_value(json!({
            "starting_location": "Denver",
            "travel_window_start": "June first",
            "travel_window_end": "2025-06-30",
            "trip_duration_days": 4,
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_preferences_defaults_and_overrides() {
        let defaults = TripPreferences::default();
        assert_eq!(defaults.dining_budget, PriceLevel::Moderate);
        assert_eq!(defaults.preferred_cuisines, vec!["American", "Italian"]);

        let map: HashMap<String, Value> = serde_json::from_value(json!({
            "dining_budget": "expensive",
            "preferred_cuisines": "Mexican, Thai",
            "preferred_start_day": "Saturday",
            "party_size": 4,
            "waypoints": ["Cody"],
            "unrelated": {"nested": true},
        }))
        .unwrap();
        let prefs = TripPreferences::from_map(&map);
        assert_eq!(prefs.dining_budget, PriceLevel::Expensive);
        assert_eq!(prefs.preferred_cuisines, vec!["Mexican", "Thai"]);
        assert_eq!(prefs.preferred_start_day, Some(Weekday::Sat));
        assert_eq!(prefs.party_size, 4);
        assert_eq!(prefs.waypoints, vec!["Cody"]);
    }

    #[test]
    fn test_malformed_preferences_keep_defaults() {
        let map: HashMap<String, Value> = serde_json::from_value(json!({
            "dining_budget": 3,
            "party_size": -1,
            "preferred_start_day": "someday",
        }))
        .unwrap();
        let prefs = TripPreferences::from_map(&map);
        assert_eq!(prefs, TripPreferences::default());
    }
}
