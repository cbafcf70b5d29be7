//! Driving route model

use serde::{Deserialize, Serialize};

/// Average driving speed used to derive durations from distances
pub const AVERAGE_SPEED_MPH: f64 = 65.0;

/// One leg of a route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSegment {
    #[serde(rename = "from")]
    pub from_location: String,
    #[serde(rename = "to")]
    pub to_location: String,
    pub distance_miles: f64,
    pub duration_minutes: u32,
    #[serde(default)]
    pub road_names: Vec<String>,
}

impl RouteSegment {
    /// Create a segment whose duration follows from the average speed
    #[must_use]
    pub fn driving(from: &str, to: &str, distance_miles: f64, road_names: Vec<String>) -> Self {
        let distance_miles = (distance_miles.max(0.0) * 10.0).round() / 10.0;
        Self {
            from_location: from.to_string(),
            to_location: to.to_string(),
            distance_miles,
            duration_minutes: (distance_miles / AVERAGE_SPEED_MPH * 60.0).round() as u32,
            road_names,
        }
    }
}

/// Route from origin to destination through ordered segments
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutePlan {
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub segments: Vec<RouteSegment>,
    #[serde(default)]
    pub total_distance_miles: f64,
    #[serde(default)]
    pub total_duration_minutes: u32,
    #[serde(default)]
    pub total_duration_hours: f64,
    /// Model reply the plan was derived from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_reply: Option<String>,
}

impl RoutePlan {
    /// Build a plan and derive its totals from the segments
    #[must_use]
    pub fn from_segments(origin: &str, destination: &str, segments: Vec<RouteSegment>) -> Self {
        let mut plan = Self {
            origin: origin.to_string(),
            destination: destination.to_string(),
            segments,
            ..Self::default()
        };
        plan.recompute_totals();
        plan
    }

    /// Route with no segments, used when the route stage fails
    #[must_use]
    pub fn unavailable(origin: &str, destination: &str) -> Self {
        Self::from_segments(origin, destination, Vec::new())
    }

    pub fn recompute_totals(&mut self) {
        let distance: f64 = self.segments.iter().map(|s| s.distance_miles).sum();
        let minutes: u32 = self.segments.iter().map(|s| s.duration_minutes).sum();
        self.total_distance_miles = (distance * 10.0).round() / 10.0;
        self.total_duration_minutes = minutes;
        self.total_duration_hours = (f64::from(minutes) / 60.0 * 10.0).round() / 10.0;
    }

    /// Whether every segment starts where the previous one ended
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.segments
            .windows(2)
            .all(|pair| pair[0].to_location == pair[1].from_location)
    }

    /// Locations the traveller stops at, in order. Every segment end counts as
    /// a stop; a route without segments stops only at its destination.
    #[must_use]
    pub fn stops(&self) -> Vec<String> {
        if self.segments.is_empty() {
            return if self.destination.is_empty() {
                Vec::new()
            } else {
                vec![self.destination.clone()]
            };
        }

        let mut stops: Vec<String> = Vec::with_capacity(self.segments.len());
        for segment in &self.segments {
            if !stops.contains(&segment.to_location) {
                stops.push(segment.to_location.clone());
            }
        }
        stops
    }
}

/// Input to the route stage
#[derive(Debug, Clone, PartialEq)]
pub struct RouteQuery {
    pub origin: String,
    pub destination: String,
    pub waypoints: Vec<String>,
    pub travel_date: chrono::NaiveDate,
}
