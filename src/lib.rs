//! `parkplanner` - National park trip planning
//!
//! This library coordinates the calendar, weather, route, dining and hotel
//! agents behind a best-effort orchestrator and assembles their results into
//! one trip plan.

pub mod agents;
pub mod aggregator;
pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod mock;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod telemetry;

// Re-export core types for public API
pub use agents::AgentSet;
pub use config::{AppMode, PlannerConfig};
pub use error::PlannerError;
pub use models::{TripPlan, TripRequest};
pub use orchestrator::TripOrchestrator;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, PlannerError>;
