//! HTTP surface of the synthetic weather, hotel, restaurant and route backends

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

use super::{SharedRng, dining, lodging, routes, weather};
use crate::config::{FailureRates, MockConfig};
use crate::models::{
    DateRange, HotelQuery, HotelSearchResponse, PriceLevel, RestaurantSearchResponse,
    RoomReservation, RoomReservationRequest, TableReservation, TableReservationRequest,
};

/// Shared state of the mock backend
#[derive(Debug, Clone)]
pub struct MockState {
    pub rng: SharedRng,
    pub failure_rates: FailureRates,
}

impl MockState {
    #[must_use]
    pub fn new(rng: SharedRng, failure_rates: FailureRates) -> Self {
        Self { rng, failure_rates }
    }

    #[must_use]
    pub fn from_config(config: &MockConfig) -> Self {
        Self::new(SharedRng::new(config.seed), config.failure_rates.clone())
    }
}

type Params = Query<Vec<(String, String)>>;

/// First value of a query parameter
fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.trim())
        .filter(|v| !v.is_empty())
}

/// Every value of a repeated or comma separated query parameter
fn param_list(params: &[(String, String)], key: &str) -> Vec<String> {
    params
        .iter()
        .filter(|(k, _)| k == key)
        .flat_map(|(_, v)| v.split(','))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

fn required<'a>(params: &'a [(String, String)], key: &str) -> Result<&'a str, Response> {
    param(params, key).ok_or_else(|| {
        detail(
            StatusCode::UNPROCESSABLE_ENTITY,
            &format!("Missing query parameter '{key}'"),
        )
    })
}

fn date_param(params: &[(String, String)], key: &str) -> Result<NaiveDate, Response> {
    NaiveDate::parse_from_str(required(params, key)?, "%Y-%m-%d")
        .map_err(|_| detail(StatusCode::BAD_REQUEST, "Invalid date format"))
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

fn unavailable(state: &MockState, service: &str, rate: f64) -> Result<(), Response> {
    state
        .rng
        .maybe_fail(service, rate, "Service temporarily unavailable")
        .map_err(|_| {
            detail(
                StatusCode::SERVICE_UNAVAILABLE,
                "Service temporarily unavailable",
            )
        })
}

async fn root() -> Json<Value> {
    Json(json!({
        "name": "Yellowstone Trip Planner Test APIs",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Synthetic weather, lodging, dining and routing services",
        "endpoints": {
            "weather": "/weather/{location}",
            "hotels": { "search": "/hotels/search", "reserve": "/hotels/reserve" },
            "restaurants": { "search": "/restaurants/search", "reserve": "/restaurants/reserve" },
            "routes": {
                "plan": "/routes/plan",
                "available": "/routes/available",
                "details": "/routes/{route_id}/details"
            }
        }
    }))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Longest forecast the weather endpoint serves
const MAX_FORECAST_DAYS: i64 = 366;

async fn get_weather(
    State(state): State<MockState>,
    Path(location): Path<String>,
    Query(params): Params,
) -> Result<Response, Response> {
    let start = date_param(&params, "start_date")?;
    let end = date_param(&params, "end_date")?;
    if end < start {
        return Err(detail(
            StatusCode::BAD_REQUEST,
            "end_date must not be before start_date",
        ));
    }
    let span = (end - start).num_days() + 1;
    if span > MAX_FORECAST_DAYS {
        return Err(detail(
            StatusCode::BAD_REQUEST,
            &format!("forecasts cover at most {MAX_FORECAST_DAYS} days"),
        ));
    }
    unavailable(&state, "weather", state.failure_rates.weather)?;

    let days = u32::try_from(span).unwrap_or(1);
    let range = DateRange::unscored(start, days);
    let mut forecast = weather::forecast(&state.rng, &location, &range);
    forecast.data_source = None;
    tracing::debug!(%location, days, "Serving synthetic forecast");
    Ok(Json(forecast).into_response())
}

async fn search_hotels(
    State(state): State<MockState>,
    Query(params): Params,
) -> Result<Json<HotelSearchResponse>, Response> {
    let location = required(&params, "location")?.to_string();
    let check_in = date_param(&params, "check_in")?;
    let check_out = date_param(&params, "check_out")?;
    unavailable(&state, "hotel", state.failure_rates.hotel_search)?;

    let query = HotelQuery {
        location,
        check_in,
        check_out,
        max_price: param(&params, "max_price").and_then(|v| v.parse().ok()),
        amenities: param_list(&params, "amenities"),
    };
    let results = lodging::search(&state.rng, &query);
    tracing::debug!(location = %query.location, count = results.len(), "Hotel search");
    Ok(Json(HotelSearchResponse::new(results)))
}

async fn reserve_hotel(
    State(state): State<MockState>,
    Query(request): Query<RoomReservationRequest>,
) -> Result<Json<RoomReservation>, Response> {
    if state.rng.chance(state.failure_rates.hotel_reservation) {
        tracing::info!(hotel = %request.hotel_name, "Synthetic hotel reservation failure");
        return Err(detail(StatusCode::BAD_REQUEST, "Unable to complete reservation"));
    }
    let code = state.rng.confirmation_code(8);
    Ok(Json(RoomReservation::confirmed(&request, code)))
}

async fn search_restaurants(
    State(state): State<MockState>,
    Query(params): Params,
) -> Result<Json<RestaurantSearchResponse>, Response> {
    let location = required(&params, "location")?;
    unavailable(&state, "restaurant", state.failure_rates.restaurant_search)?;

    let cuisines = param_list(&params, "cuisine");
    let price_level = match param(&params, "price_level") {
        Some(raw) => Some(
            raw.parse::<PriceLevel>()
                .map_err(|e| detail(StatusCode::BAD_REQUEST, &e))?,
        ),
        None => Some(PriceLevel::Moderate),
    };
    let results = dining::search(&state.rng, location, &cuisines, price_level);
    Ok(Json(RestaurantSearchResponse { results }))
}

async fn reserve_restaurant(
    State(state): State<MockState>,
    Query(request): Query<TableReservationRequest>,
) -> Result<Json<TableReservation>, Response> {
    if state.rng.chance(state.failure_rates.restaurant_reservation) {
        tracing::info!(restaurant = %request.restaurant_name, "Synthetic table reservation failure");
        return Err(detail(
            StatusCode::BAD_REQUEST,
            "No availability for selected time",
        ));
    }
    let code = state.rng.confirmation_code(6);
    Ok(Json(TableReservation::confirmed(&request, code)))
}

async fn plan_route(
    State(state): State<MockState>,
    Query(params): Params,
) -> Result<Response, Response> {
    let origin = required(&params, "origin")?;
    let destination = required(&params, "destination")?;
    unavailable(&state, "route", state.failure_rates.route)?;

    let waypoints: Vec<String> = params
        .iter()
        .filter(|(k, _)| k == "waypoints")
        .map(|(_, v)| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();
    Ok(Json(routes::plan(origin, destination, &waypoints)).into_response())
}

async fn available_routes() -> Json<Value> {
    let summaries: Vec<routes::CorridorSummary> =
        routes::corridors().iter().map(Into::into).collect();
    Json(json!({ "routes": summaries }))
}

async fn route_details(Path(route_id): Path<String>) -> Result<Json<routes::Corridor>, Response> {
    routes::corridor(&route_id)
        .map(Json)
        .ok_or_else(|| detail(StatusCode::NOT_FOUND, "Route not found"))
}

/// Router exposing the synthetic backends
pub fn router(state: MockState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/weather/{location}", get(get_weather))
        .route("/hotels/search", get(search_hotels))
        .route("/hotels/reserve", post(reserve_hotel))
        .route("/restaurants/search", get(search_restaurants))
        .route("/restaurants/reserve", post(reserve_restaurant))
        .route("/routes/plan", get(plan_route))
        .route("/routes/available", get(available_routes))
        .route("/routes/{route_id}/details", get(route_details))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
