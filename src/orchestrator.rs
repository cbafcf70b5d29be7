//! Trip planning pipeline
//!
//! Runs the agents for one request in dependency order:
//!
//! 1. dates
//! 2. weather and route, concurrently
//! 3. dining for the route's stops, concurrently with the hotel search
//! 4. aggregation
//!
//! A failing or slow stage is replaced by its default and recorded in the
//! plan's stage reports. Only an invalid request fails the whole call.

use std::future::Future;
use std::time::Duration;

use chrono::Duration as Days;
use tracing::{info, instrument, warn};

use crate::PlannerError;
use crate::agents::AgentSet;
use crate::aggregator::{self, StageOutputs};
use crate::config::{OrchestrationConfig, PlannerConfig};
use crate::mock::routes::YELLOWSTONE_WAYPOINTS;
use crate::models::{
    CalendarQuery, DateRange, DateRecommendations, DiningQuery,
    HotelQuery, PlanStage, RoomReservation, RoomReservationRequest, RoutePlan, RouteQuery,
    StageReport, TableReservation, TableReservationRequest, TripPlan, TripPreferences,
    TripRequest,
};

/// Pause between reservation attempts, multiplied by the attempt number
const RESERVATION_BACKOFF: Duration = Duration::from_millis(100);

pub struct TripOrchestrator {
    agents: AgentSet,
    config: OrchestrationConfig,
}

impl std::fmt::Debug for TripOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TripOrchestrator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TripOrchestrator {
    #[must_use]
    pub fn new(agents: AgentSet, config: OrchestrationConfig) -> Self {
        Self { agents, config }
    }

    /// Build the agents for the configured mode
    pub fn from_config(config: &PlannerConfig) -> crate::Result<Self> {
        let agents = AgentSet::from_config(config)?;
        Ok(Self::new(agents, config.orchestration.clone()))
    }

    #[must_use]
    pub fn config(&self) -> &OrchestrationConfig {
        &self.config
    }

    /// Plan a trip. Fails only for an invalid request; every other problem
    /// degrades the affected section.
    #[instrument(
        skip(self, request),
        fields(origin = %request.starting_location, days = request.trip_duration_days)
    )]
    pub async fn plan_trip(&self, request: &TripRequest) -> crate::Result<TripPlan> {
        request.validate()?;
        let preferences = request.preferences();
        let destination = self.config.destination.clone();
        let mut reports = Vec::with_capacity(6);
        let mut notes = Vec::new();

        let calendar_query = CalendarQuery {
            window_start: request.travel_window_start,
            window_end: request.travel_window_end,
            duration_days: request.trip_duration_days,
            preferred_start_day: preferences.preferred_start_day,
        };
        let calendar = self
            .run_stage(
                PlanStage::Dates,
                self.agents.calendar.recommend_dates(&calendar_query),
            )
            .await;
        let (recommendations, selected_dates) =
            self.resolve_dates(request, calendar, &mut reports, &mut notes);
        info!(
            start = %selected_dates.start_date,
            end = %selected_dates.end_date,
            "Travel dates resolved"
        );

        let route_query = RouteQuery {
            origin: request.starting_location.clone(),
            destination: destination.clone(),
            waypoints: self.waypoints(&preferences),
            travel_date: selected_dates.start_date,
        };
        let (weather, route) = tokio::join!(
            self.run_stage(
                PlanStage::Weather,
                self.agents.weather.forecast(&destination, &selected_dates),
            ),
            self.run_stage(PlanStage::Route, self.agents.route.plan_route(&route_query)),
        );
        let weather = Self::settle(PlanStage::Weather, weather, &mut reports);
        let route = Self::settle(PlanStage::Route, route, &mut reports)
            .unwrap_or_else(|| RoutePlan::unavailable(&request.starting_location, &destination));

        let dining_query = DiningQuery {
            locations: route.stops(),
            cuisine_preferences: preferences.preferred_cuisines.clone(),
            price_level: preferences.dining_budget,
            travel_dates: selected_dates.dates(),
        };
        let hotel_query = HotelQuery {
            location: destination.clone(),
            check_in: selected_dates.start_date,
            check_out: selected_dates
                .end_date
                .max(selected_dates.start_date + Days::days(1)),
            max_price: preferences.max_hotel_price,
            amenities: preferences.hotel_amenities.clone(),
        };
        let hotel_search = async {
            if self.config.include_hotels {
                Some(
                    self.run_stage(PlanStage::Hotels, self.agents.hotel.search(&hotel_query))
                        .await,
                )
            } else {
                None
            }
        };
        let (dining, hotels) = tokio::join!(
            self.run_stage(PlanStage::Dining, self.agents.dining.recommend(&dining_query)),
            hotel_search,
        );
        let dining = Self::settle(PlanStage::Dining, dining, &mut reports).unwrap_or_default();
        let hotels = match hotels {
            Some(result) => Self::settle(PlanStage::Hotels, result, &mut reports)
                .map(|response| response.results)
                .unwrap_or_default(),
            None => {
                reports.push(StageReport::skipped(PlanStage::Hotels, "hotel search disabled"));
                Vec::new()
            }
        };

        reports.push(StageReport::completed(PlanStage::Aggregation));
        let plan = aggregator::aggregate(StageOutputs {
            starting_location: request.starting_location.clone(),
            duration_days: request.trip_duration_days,
            budget: request.budget,
            preferences,
            recommendations,
            selected_dates,
            weather,
            route,
            dining_stops: dining_query.locations,
            dining,
            hotels,
            reports,
            notes,
        });

        info!(degraded = plan.is_degraded(), "Trip plan assembled");
        Ok(plan)
    }

    /// Book a room, retrying failed attempts. Exhausting every attempt gives
    /// a reservation with failed status rather than an error.
    #[instrument(skip(self, request), fields(hotel = %request.hotel_name))]
    pub async fn reserve_room(
        &self,
        request: &RoomReservationRequest,
    ) -> crate::Result<RoomReservation> {
        if request.hotel_name.trim().is_empty() {
            return Err(PlannerError::validation("hotel_name must not be empty"));
        }
        if request.check_out <= request.check_in {
            return Err(PlannerError::validation("check_out must be after check_in"));
        }
        if request.guests == 0 {
            return Err(PlannerError::validation("guests must be at least 1"));
        }

        let message = match self
            .with_attempts(|| self.agents.hotel.reserve(request))
            .await
        {
            Ok(reservation) => return Ok(reservation),
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => err.to_string(),
        };
        Ok(RoomReservation::failed(request, message))
    }

    /// Book a table, retrying failed attempts
    #[instrument(skip(self, request), fields(restaurant = %request.restaurant_name))]
    pub async fn reserve_table(
        &self,
        request: &TableReservationRequest,
    ) -> crate::Result<TableReservation> {
        if request.restaurant_name.trim().is_empty() {
            return Err(PlannerError::validation("restaurant_name must not be empty"));
        }
        if request.party_size == 0 {
            return Err(PlannerError::validation("party_size must be at least 1"));
        }

        let message = match self
            .with_attempts(|| self.agents.dining.reserve(request))
            .await
        {
            Ok(reservation) => return Ok(reservation),
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => err.to_string(),
        };
        Ok(TableReservation::failed(request, message))
    }

    async fn with_attempts<T, F, Fut>(&self, mut call: F) -> crate::Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = crate::Result<T>>,
    {
        let attempts = self.config.reservation_attempts.max(1);
        let mut attempt = 1;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_fatal() || attempt >= attempts => return Err(err),
                Err(err) => {
                    warn!(attempt, error = %err, "Reservation attempt failed, retrying");
                    tokio::time::sleep(RESERVATION_BACKOFF * attempt).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Await one stage under the stage timeout. The error side carries the
    /// reason the stage is degraded.
    async fn run_stage<T, F>(&self, stage: PlanStage, call: F) -> Result<T, String>
    where
        F: Future<Output = crate::Result<T>>,
    {
        let limit = Duration::from_secs(u64::from(self.config.stage_timeout_seconds.max(1)));
        match tokio::time::timeout(limit, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                warn!(%stage, error = %err, "Stage failed, using defaults");
                Err(err.to_string())
            }
            Err(_) => {
                warn!(%stage, timeout_secs = limit.as_secs(), "Stage timed out, using defaults");
                Err(format!("timed out after {}s", limit.as_secs()))
            }
        }
    }

    fn settle<T>(
        stage: PlanStage,
        result: Result<T, String>,
        reports: &mut Vec<StageReport>,
    ) -> Option<T> {
        match result {
            Ok(value) => {
                reports.push(StageReport::completed(stage));
                Some(value)
            }
            Err(reason) => {
                reports.push(StageReport::degraded(stage, reason));
                None
            }
        }
    }

    /// The best recommended range, or a default range when the calendar
    /// stage failed or recommended nothing
    fn resolve_dates(
        &self,
        request: &TripRequest,
        calendar: Result<DateRecommendations, String>,
        reports: &mut Vec<StageReport>,
        notes: &mut Vec<String>,
    ) -> (DateRecommendations, DateRange) {
        let recommendations = match calendar {
            Ok(recs) => recs,
            Err(reason) => {
                reports.push(StageReport::degraded(PlanStage::Dates, reason));
                return (DateRecommendations::unavailable(), self.default_dates(request));
            }
        };

        match recommendations.best().cloned() {
            Some(best) => {
                reports.push(StageReport::completed(PlanStage::Dates));
                (recommendations, best)
            }
            None => {
                reports.push(StageReport::degraded(
                    PlanStage::Dates,
                    "no date ranges recommended",
                ));
                if !recommendations.reasoning.trim().is_empty() {
                    notes.push(recommendations.reasoning);
                }
                (DateRecommendations::unavailable(), self.default_dates(request))
            }
        }
    }

    /// Window start plus the configured offset, moved earlier if the trip
    /// would otherwise end after the window
    #[must_use]
    pub fn default_dates(&self, request: &TripRequest) -> DateRange {
        let duration = request.trip_duration_days.max(1);
        let offset = request.travel_window_start
            + Days::days(i64::from(self.config.default_start_offset_days));
        let last_start = request.travel_window_end - Days::days(i64::from(duration) - 1);
        let start = offset.min(last_start).max(request.travel_window_start);
        DateRange::unscored(start, duration)
    }

    /// Waypoints from the preferences, or the park highlights when visiting
    /// Yellowstone without any
    fn waypoints(&self, preferences: &TripPreferences) -> Vec<String> {
        if !preferences.waypoints.is_empty() {
            return preferences.waypoints.clone();
        }
        if self.config.destination.to_lowercase().contains("yellowstone") {
            return YELLOWSTONE_WAYPOINTS.iter().map(|w| (*w).to_string()).collect();
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::SharedRng;
    use chrono::NaiveDate;

    fn request(start: &str, end: &str, days: u32) -> TripRequest {
        TripRequest {
            starting_location: "Denver".to_string(),
            travel_window_start: NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap(),
            travel_window_end: NaiveDate::parse_from_str(end, "%Y-%m-%d").unwrap(),
            trip_duration_days: days,
            preferences: None,
            budget: None,
        }
    }

    fn orchestrator() -> TripOrchestrator {
        let config = PlannerConfig::default();
        TripOrchestrator::new(
            AgentSet::local(SharedRng::seeded(11), &config),
            config.orchestration,
        )
    }

    #[test]
    fn test_default_dates_offset() {
        let range = orchestrator().default_dates(&request("2025-06-01", "2025-06-30", 4));
        assert_eq!(range.start_date, NaiveDate::from_ymd_opt(2025, 6, 8).unwrap());
        assert_eq!(range.num_days(), 4);
    }

    #[test]
    fn test_default_dates_stay_inside_short_window() {
        let range = orchestrator().default_dates(&request("2025-06-01", "2025-06-06", 4));
        assert_eq!(range.start_date, NaiveDate::from_ymd_opt(2025, 6, 3).unwrap());
        assert_eq!(range.end_date, NaiveDate::from_ymd_opt(2025, 6, 6).unwrap());
    }

    #[test]
    fn test_default_waypoints_only_without_preferences() {
        let orch = orchestrator();
        assert_eq!(orch.waypoints(&TripPreferences::default()).len(), 5);

        let prefs = TripPreferences {
            waypoints: vec!["Cody".to_string()],
            ..TripPreferences::default()
        };
        assert_eq!(orch.waypoints(&prefs), vec!["Cody"]);
    }

    #[tokio::test]
    async fn test_invalid_request_is_rejected() {
        let err = orchestrator()
            .plan_trip(&request("2025-06-01", "2025-06-30", 20))
            .await
            .unwrap_err();
        assert!(matches!(err, PlannerError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_stage_reports_in_order() {
        let plan = orchestrator()
            .plan_trip(&request("2025-06-01", "2025-06-30", 3))
            .await
            .unwrap();
        let stages: Vec<PlanStage> = plan.stage_reports.iter().map(|r| r.stage).collect();
        assert_eq!(
            stages,
            vec![
                PlanStage::Dates,
                PlanStage::Weather,
                PlanStage::Route,
                PlanStage::Dining,
                PlanStage::Hotels,
                PlanStage::Aggregation,
            ]
        );
        assert!(!plan.is_degraded());
    }

    #[tokio::test]
    async fn test_reservation_validation() {
        let day = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        let request = RoomReservationRequest {
            hotel_name: "Old Faithful Inn".to_string(),
            check_in: day,
            check_out: day,
            guests: 2,
        };
        let err = orchestrator().reserve_room(&request).await.unwrap_err();
        assert!(matches!(err, PlannerError::Validation { .. }));
    }
}
