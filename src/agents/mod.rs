//! Domain agents
//!
//! Each domain (calendar, weather, route, dining, hotel) is exposed through one
//! provider trait with three interchangeable strategies:
//! - Local: synthetic data from the `mock` generators
//! - Llm: suggestions produced by a language model
//! - Live: HTTP calls to the backing services
//!
//! The strategy is picked once when the [`AgentSet`] is built.

pub mod calendar;
pub mod dining;
pub mod hotel;
pub mod prompts;
pub mod route;
pub mod weather;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::{AppMode, PlannerConfig};
use crate::llm::{self, TextGenerator};
use crate::mock::SharedRng;
use crate::models::{
    CalendarQuery, DateRange, DateRecommendations, DiningQuery, DiningRecommendations,
    HotelQuery, HotelSearchResponse, RoomReservation, RoomReservationRequest, RoutePlan,
    RouteQuery, TableReservation, TableReservationRequest, WeatherForecast,
};
use crate::services::ServiceClient;

pub use calendar::{LlmCalendarAgent, LocalCalendarAgent};
pub use dining::{LiveDiningAgent, LlmDiningAgent, LocalDiningAgent};
pub use hotel::{LiveHotelAgent, LlmHotelAgent, LocalHotelAgent};
pub use route::{LiveRouteAgent, LlmRouteAgent, LocalRouteAgent};
pub use weather::{LiveWeatherAgent, LlmWeatherAgent, LocalWeatherAgent};

#[async_trait]
pub trait CalendarProvider: Send + Sync {
    async fn recommend_dates(&self, query: &CalendarQuery) -> crate::Result<DateRecommendations>;
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn forecast(&self, location: &str, dates: &DateRange) -> crate::Result<WeatherForecast>;
}

#[async_trait]
pub trait RouteProvider: Send + Sync {
    async fn plan_route(&self, query: &RouteQuery) -> crate::Result<RoutePlan>;
}

#[async_trait]
pub trait DiningProvider: Send + Sync {
    async fn recommend(&self, query: &DiningQuery) -> crate::Result<DiningRecommendations>;

    async fn reserve(&self, request: &TableReservationRequest) -> crate::Result<TableReservation>;
}

#[async_trait]
pub trait HotelProvider: Send + Sync {
    async fn search(&self, query: &HotelQuery) -> crate::Result<HotelSearchResponse>;

    async fn reserve(&self, request: &RoomReservationRequest) -> crate::Result<RoomReservation>;
}

/// One provider per domain, shared by every request
#[derive(Clone)]
pub struct AgentSet {
    pub calendar: Arc<dyn CalendarProvider>,
    pub weather: Arc<dyn WeatherProvider>,
    pub route: Arc<dyn RouteProvider>,
    pub dining: Arc<dyn DiningProvider>,
    pub hotel: Arc<dyn HotelProvider>,
}

impl std::fmt::Debug for AgentSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentSet").finish_non_exhaustive()
    }
}

impl AgentSet {
    /// Build the providers for the configured mode. Fails with a
    /// configuration error when the mode's settings are incomplete.
    pub fn from_config(config: &PlannerConfig) -> crate::Result<Self> {
        config.validate_for_mode()?;
        let rng = SharedRng::new(config.mock.seed);

        let agents = match config.mode {
            AppMode::LocalDummy => Self::local(rng, config),
            AppMode::LlmSuggestions => {
                let generator = llm::create_generator(&config.llm)?;
                Self::llm(generator, rng, config)
            }
            AppMode::LiveApi => {
                let client = ServiceClient::from_config(&config.services)?;
                Self::live(client, rng)
            }
        };
        info!(mode = %config.mode, "Agents ready");
        Ok(agents)
    }

    /// Synthetic data for every domain
    #[must_use]
    pub fn local(rng: SharedRng, config: &PlannerConfig) -> Self {
        let rates = &config.mock.failure_rates;
        Self {
            calendar: Arc::new(LocalCalendarAgent::new(rng.clone())),
            weather: Arc::new(LocalWeatherAgent::new(rng.clone(), rates.weather)),
            route: Arc::new(LocalRouteAgent::new(rng.clone(), rates.route)),
            dining: Arc::new(LocalDiningAgent::new(
                rng.clone(),
                rates.restaurant_search,
                rates.restaurant_reservation,
            )),
            hotel: Arc::new(LocalHotelAgent::new(
                rng,
                rates.hotel_search,
                rates.hotel_reservation,
            )),
        }
    }

    /// Model suggestions; bookings stay synthetic
    #[must_use]
    pub fn llm(generator: Arc<dyn TextGenerator>, rng: SharedRng, config: &PlannerConfig) -> Self {
        let rates = &config.mock.failure_rates;
        Self {
            calendar: Arc::new(LlmCalendarAgent::new(generator.clone())),
            weather: Arc::new(LlmWeatherAgent::new(generator.clone())),
            route: Arc::new(LlmRouteAgent::new(generator.clone())),
            dining: Arc::new(LlmDiningAgent::new(
                generator.clone(),
                rng.clone(),
                rates.restaurant_reservation,
            )),
            hotel: Arc::new(LlmHotelAgent::new(generator, rng, rates.hotel_reservation)),
        }
    }

    /// HTTP backends; date selection has no backend and runs locally
    #[must_use]
    pub fn live(client: ServiceClient, rng: SharedRng) -> Self {
        Self {
            calendar: Arc::new(LocalCalendarAgent::new(rng)),
            weather: Arc::new(LiveWeatherAgent::new(client.clone())),
            route: Arc::new(LiveRouteAgent::new(client.clone())),
            dining: Arc::new(LiveDiningAgent::new(client.clone())),
            hotel: Arc::new(LiveHotelAgent::new(client)),
        }
    }
}
