//! HTTP API of the trip planner

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::PlannerError;
use crate::config::{AppMode, PlannerConfig};
use crate::models::{
    RoomReservation, RoomReservationRequest, TableReservation, TableReservationRequest,
    TripPlan, TripRequest,
};
use crate::orchestrator::TripOrchestrator;

/// Largest accepted request body
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Shared state of the API. A planner that could not be built is kept as
/// its error so every request can report it.
#[derive(Debug, Clone)]
pub struct AppState {
    planner: Result<Arc<TripOrchestrator>, String>,
    mode: AppMode,
}

impl AppState {
    #[must_use]
    pub fn new(orchestrator: TripOrchestrator, mode: AppMode) -> Self {
        Self {
            planner: Ok(Arc::new(orchestrator)),
            mode,
        }
    }

    #[must_use]
    pub fn from_config(config: &PlannerConfig) -> Self {
        let planner = TripOrchestrator::from_config(config).map(Arc::new).map_err(|err| {
            error!(error = %err, mode = %config.mode, "Planner is not available");
            err.user_message()
        });
        Self {
            planner,
            mode: config.mode,
        }
    }

    fn planner(&self) -> Result<&TripOrchestrator, ApiError> {
        self.planner
            .as_deref()
            .map_err(|message| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, message.clone()))
    }
}

/// Error body `{"detail": ...}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

impl From<PlannerError> for ApiError {
    fn from(err: PlannerError) -> Self {
        if !err.is_fatal() {
            error!(error = %err, "Request failed");
        }
        Self::new(err.status_code(), err.user_message())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        PlannerError::validation(rejection.body_text()).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServerInfo {
    pub message: String,
    pub mode: AppMode,
    pub status: String,
}

async fn root(State(state): State<AppState>) -> Json<ServerInfo> {
    let status = if state.planner.is_ok() {
        "ready"
    } else {
        "misconfigured"
    };
    Json(ServerInfo {
        message: "Server is running".to_string(),
        mode: state.mode,
        status: status.to_string(),
    })
}

async fn plan_trip(
    State(state): State<AppState>,
    body: Result<Json<TripRequest>, JsonRejection>,
) -> Result<Json<TripPlan>, ApiError> {
    let Json(request) = body?;
    info!(origin = %request.starting_location, "Planning trip");
    let plan = state.planner()?.plan_trip(&request).await?;
    Ok(Json(plan))
}

async fn reserve_hotel(
    State(state): State<AppState>,
    body: Result<Json<RoomReservationRequest>, JsonRejection>,
) -> Result<Json<RoomReservation>, ApiError> {
    let Json(request) = body?;
    Ok(Json(state.planner()?.reserve_room(&request).await?))
}

async fn reserve_restaurant(
    State(state): State<AppState>,
    body: Result<Json<TableReservationRequest>, JsonRejection>,
) -> Result<Json<TableReservation>, ApiError> {
    let Json(request) = body?;
    Ok(Json(state.planner()?.reserve_table(&request).await?))
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/api/plan-trip", post(plan_trip))
        .route("/api/reservations/hotel", post(reserve_hotel))
        .route("/api/reservations/restaurant", post(reserve_restaurant))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::AgentSet;
    use crate::mock::SharedRng;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use serde_json::Value;
    use tower::ServiceExt;

    fn app() -> Router {
        let config = PlannerConfig::default();
        let orchestrator = TripOrchestrator::new(
            AgentSet::local(SharedRng::seeded(21), &config),
            config.orchestration.clone(),
        );
        router(AppState::new(orchestrator, config.mode))
    }

    async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::post(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_root_reports_mode() {
        let response = app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let info: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(info["message"], "Server is running");
        assert_eq!(info["mode"], "local_dummy");
        assert_eq!(info["status"], "ready");
    }

    #[tokio::test]
    async fn test_plan_trip() {
        let body = r#"{"starting_location": "Denver", "travel_window_start": "2025-06-01",
            "travel_window_end": "2025-06-30", "trip_duration_days": 4}"#;
        let (status, plan) = post_json(app(), "/api/plan-trip", body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(plan["weather_forecast"].as_array().unwrap().len(), 4);
        assert!(plan["raw_plan"].as_str().unwrap().contains("Denver"));
    }

    #[tokio::test]
    async fn test_invalid_duration_is_500_with_detail() {
        let body = r#"{"starting_location": "Denver", "travel_window_start": "2025-06-01",
            "travel_window_end": "2025-06-30", "trip_duration_days": 30}"#;
        let (status, error) = post_json(app(), "/api/plan-trip", body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(error["detail"].as_str().unwrap().contains("trip_duration_days"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_500_with_detail() {
        let (status, error) = post_json(app(), "/api/plan-trip", r#"{"starting_location": 1}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(error["detail"].as_str().unwrap().starts_with("Invalid input"));
    }

    #[tokio::test]
    async fn test_misconfigured_planner() {
        let config = PlannerConfig {
            mode: AppMode::LlmSuggestions,
            ..PlannerConfig::default()
        };
        let app = router(AppState::from_config(&config));
        let body = r#"{"starting_location": "Denver", "travel_window_start": "2025-06-01",
            "travel_window_end": "2025-06-30", "trip_duration_days": 4}"#;
        let (status, error) = post_json(app, "/api/plan-trip", body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(
            error["detail"]
                .as_str()
                .unwrap()
                .contains("Missing required Azure OpenAI configuration")
        );
    }

    #[test]
    fn test_downstream_detail_hides_internals() {
        let err: ApiError = PlannerError::downstream("hotels", "connect error: 10.0.0.7:8000").into();
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
        assert!(err.detail.contains("hotels service is currently unavailable"));
        assert!(!err.detail.contains("10.0.0.7"));
    }

    #[tokio::test]
    async fn test_restaurant_reservation() {
        let body = r#"{"restaurant_name": "Wonderland Cafe", "date": "2025-06-10",
            "time": "18:30", "party_size": 2}"#;
        let (status, booking) = post_json(app(), "/api/reservations/restaurant", body).await;
        assert_eq!(status, StatusCode::OK);
        assert!(booking["status"] == "confirmed" || booking["status"] == "failed");
        assert_eq!(booking["restaurant"], "Wonderland Cafe");
    }
}
