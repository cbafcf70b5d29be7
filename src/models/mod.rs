//! Data models for the trip planner
//!
//! This module contains the domain models organized by concern:
//! - Trip: request, preferences and the assembled plan
//! - Calendar: candidate date ranges and their scores
//! - Weather, Route, Dining, Hotel: per-agent results
//! - Reservation: booking requests and confirmations

pub mod calendar;
pub mod dining;
pub mod hotel;
pub mod reservation;
pub mod route;
pub mod trip;
pub mod weather;

// Re-export all public types for convenient access
pub use calendar::{CalendarQuery, DateRange, DateRecommendations};
pub use dining::{
    DiningQuery, DiningRecommendations, LocationDining, PriceLevel, Restaurant,
    RestaurantSearchResponse,
};
pub use hotel::{EstimatedCosts, Hotel, HotelClass, HotelQuery, HotelSearchResponse};
pub use reservation::{
    ReservationStatus, RoomReservation, RoomReservationRequest, TableReservation,
    TableReservationRequest,
};
pub use route::{RoutePlan, RouteQuery, RouteSegment};
pub use trip::{
    PlanStage, StageReport, StageStatus, TripPlan, TripPreferences, TripRequest,
};
pub use weather::{DailyForecast, WeatherForecast};
