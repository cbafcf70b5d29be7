//! HTTP surface driven through the router

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use parkplanner::PlannerConfig;
use parkplanner::api::{self, AppState};
use parkplanner::config::AppMode;

fn app(mode: AppMode) -> Router {
    let mut config = PlannerConfig {
        mode,
        ..PlannerConfig::default()
    };
    config.mock.seed = Some(5);
    api::router(AppState::from_config(&config))
}

async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn post(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_readiness() {
    let (status, body) = call(app(AppMode::LocalDummy), Request::get("/").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Server is running", "mode": "local_dummy", "status": "ready"}));

    let (_, body) = call(app(AppMode::LlmSuggestions), Request::get("/").body(Body::empty()).unwrap()).await;
    assert_eq!(body["status"], "misconfigured");
}

#[tokio::test]
async fn plan_trip_with_preferences() {
    let request = json!({
        "starting_location": "Denver",
        "travel_window_start": "2025-06-01T00:00:00",
        "travel_window_end": "2025-06-30",
        "trip_duration_days": 3,
        "budget": 1500,
        "preferences": {
            "dining_budget": "budget",
            "preferred_cuisines": ["Mexican"],
            "preferred_start_day": "Friday",
            "waypoints": ["Cody", "Old Faithful"],
            "party_size": 4
        }
    });
    let (status, plan) = call(app(AppMode::LocalDummy), post("/api/plan-trip", &request)).await;
    assert_eq!(status, StatusCode::OK);

    let start = plan["selected_dates"]["start_date"].as_str().unwrap();
    let weekday = chrono::NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap().format("%A").to_string();
    assert_eq!(weekday, "Friday");

    let stops: Vec<&str> = plan["dining_recommendations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["location"].as_str().unwrap())
        .collect();
    assert_eq!(stops, vec!["Cody", "Old Faithful", "Yellowstone National Park"]);
    assert_eq!(plan["estimated_costs"]["dining_usd"], 420.0);
    assert_eq!(plan["estimated_costs"]["budget_usd"], 1500.0);
}

#[tokio::test]
async fn window_too_short_is_rejected() {
    let request = json!({
        "starting_location": "Denver",
        "travel_window_start": "2025-06-01",
        "travel_window_end": "2025-06-02",
        "trip_duration_days": 5
    });
    let (status, body) = call(app(AppMode::LocalDummy), post("/api/plan-trip", &request)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().contains("does not fit"));
}

#[tokio::test]
async fn hotel_reservation_endpoint() {
    let request = json!({
        "hotel_name": "Lake Yellowstone Hotel",
        "check_in": "2025-06-10",
        "check_out": "2025-06-12",
        "guests": 2
    });
    let (status, booking) = call(app(AppMode::LocalDummy), post("/api/reservations/hotel", &request)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(booking["hotel"], "Lake Yellowstone Hotel");
    assert!(booking["status"] == "confirmed" || booking["status"] == "failed");
}
