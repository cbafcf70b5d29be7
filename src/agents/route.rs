//! Driving route planning

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::{RouteProvider, prompts};
use crate::aggregator::extract::extract_as;
use crate::aggregator::normalize_route;
use crate::llm::TextGenerator;
use crate::mock::{self, SharedRng};
use crate::models::{RoutePlan, RouteQuery};
use crate::services::ServiceClient;

#[derive(Debug, Clone)]
pub struct LocalRouteAgent {
    rng: SharedRng,
    failure_rate: f64,
}

impl LocalRouteAgent {
    #[must_use]
    pub fn new(rng: SharedRng, failure_rate: f64) -> Self {
        Self { rng, failure_rate }
    }
}

#[async_trait]
impl RouteProvider for LocalRouteAgent {
    #[instrument(level = "debug", skip(self))]
    async fn plan_route(&self, query: &RouteQuery) -> crate::Result<RoutePlan> {
        self.rng
            .maybe_fail("route", self.failure_rate, "Synthetic routing outage")?;
        Ok(mock::routes::plan(
            &query.origin,
            &query.destination,
            &query.waypoints,
        ))
    }
}

pub struct LlmRouteAgent {
    generator: Arc<dyn TextGenerator>,
}

impl LlmRouteAgent {
    #[must_use]
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Route from a model reply; an unreadable reply gives a route without
    /// segments that still names origin and destination
    fn parse_reply(query: &RouteQuery, reply: &str) -> RoutePlan {
        let mut plan = extract_as::<RoutePlan>(reply, prompts::ROUTE_SECTION)
            .unwrap_or_else(|| RoutePlan::unavailable(&query.origin, &query.destination));
        plan.origin.clone_from(&query.origin);
        plan.destination.clone_from(&query.destination);
        let mut plan = normalize_route(plan);
        plan.raw_reply = Some(reply.to_string());
        plan
    }
}

#[async_trait]
impl RouteProvider for LlmRouteAgent {
    #[instrument(level = "debug", skip(self))]
    async fn plan_route(&self, query: &RouteQuery) -> crate::Result<RoutePlan> {
        let reply = self
            .generator
            .generate(prompts::ROUTE_SYSTEM, &prompts::route_prompt(query))
            .await?;
        let plan = Self::parse_reply(query, &reply);
        debug!(segments = plan.segments.len(), "Parsed model route");
        Ok(plan)
    }
}

#[derive(Debug, Clone)]
pub struct LiveRouteAgent {
    client: ServiceClient,
}

impl LiveRouteAgent {
    #[must_use]
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RouteProvider for LiveRouteAgent {
    async fn plan_route(&self, query: &RouteQuery) -> crate::Result<RoutePlan> {
        self.client.plan_route(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn query() -> RouteQuery {
        RouteQuery {
            origin: "Denver".to_string(),
            destination: "Yellowstone National Park".to_string(),
            waypoints: vec!["Cody".to_string()],
            travel_date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
        }
    }

    #[test]
    fn test_structured_reply_totals_are_recomputed() {
        let reply = r#"Here is your drive. "route_plan": {"segments": [
            {"from": "Denver", "to": "Cody", "distance_miles": 480.0, "duration_minutes": 450, "road_names": ["I-25"]},
            {"from": "Cody", "to": "Yellowstone National Park", "distance_miles": 52.5, "duration_minutes": 60, "road_names": ["US-14"]}
        ], "total_distance_miles": 1.0}"#;
        let plan = LlmRouteAgent::parse_reply(&query(), reply);
        assert_eq!(plan.segments.len(), 2);
        assert!((plan.total_distance_miles - 532.5).abs() < 0.01);
        assert_eq!(plan.total_duration_minutes, 510);
        assert_eq!(plan.origin, "Denver");
    }

    #[test]
    fn test_bracketed_note_before_route() {
        let reply = r#"The "route_plan" (details in [1]) is: {"segments": [
            {"from": "Denver", "to": "Cody", "distance_miles": 480.0, "duration_minutes": 450, "road_names": []},
            {"from": "Cody", "to": "Yellowstone National Park", "distance_miles": -3.0, "duration_minutes": 60, "road_names": []}
        ]}
        [1] Beartooth Highway may be closed."#;
        let plan = LlmRouteAgent::parse_reply(&query(), reply);
        assert_eq!(plan.segments.len(), 2);
        assert!(plan.is_connected());
        assert!((plan.total_distance_miles - 480.0).abs() < 0.01);
    }

    #[test]
    fn test_unreadable_reply_keeps_endpoints() {
        let plan = LlmRouteAgent::parse_reply(&query(), "Take the scenic way north.");
        assert!(plan.segments.is_empty());
        assert_eq!(plan.destination, "Yellowstone National Park");
        assert_eq!(plan.stops(), vec!["Yellowstone National Park"]);
        assert!(plan.raw_reply.is_some());
    }

    #[tokio::test]
    async fn test_local_agent_connects_points() {
        let agent = LocalRouteAgent::new(SharedRng::seeded(1), 0.0);
        let plan = agent.plan_route(&query()).await.unwrap();
        assert!(plan.is_connected());
        assert_eq!(plan.stops(), vec!["Cody", "Yellowstone National Park"]);
    }
}
