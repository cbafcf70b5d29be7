//! Live strategy against the synthetic backends served on a local port

use chrono::NaiveDate;
use tokio::net::TcpListener;

use parkplanner::agents::AgentSet;
use parkplanner::config::{FailureRates, OrchestrationConfig};
use parkplanner::mock::{self, MockState, SharedRng};
use parkplanner::models::{PlanStage, ReservationStatus, StageStatus, TripRequest};
use parkplanner::services::ServiceClient;
use parkplanner::TripOrchestrator;

fn no_failures() -> FailureRates {
    FailureRates {
        weather: 0.0,
        route: 0.0,
        hotel_search: 0.0,
        restaurant_search: 0.0,
        hotel_reservation: 0.0,
        restaurant_reservation: 0.0,
    }
}

async fn serve(rates: FailureRates) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = mock::router(MockState::new(SharedRng::seeded(8), rates));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn live_orchestrator(rates: FailureRates) -> TripOrchestrator {
    let base_url = serve(rates).await;
    let client = ServiceClient::new(&base_url, 5, 0).unwrap();
    TripOrchestrator::new(
        AgentSet::live(client, SharedRng::seeded(8)),
        OrchestrationConfig::default(),
    )
}

fn request() -> TripRequest {
    TripRequest {
        starting_location: "San Jose".to_string(),
        travel_window_start: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
        travel_window_end: NaiveDate::from_ymd_opt(2025, 7, 20).unwrap(),
        trip_duration_days: 3,
        preferences: None,
        budget: None,
    }
}

#[tokio::test]
async fn plan_over_http() {
    let plan = live_orchestrator(no_failures())
        .await
        .plan_trip(&request())
        .await
        .unwrap();

    assert!(plan.stage_reports.iter().all(|r| r.status == StageStatus::Completed));
    assert_eq!(plan.weather_forecast.len(), 3);
    assert!(plan.route_plan.is_connected());
    assert_eq!(plan.route_plan.segments[0].from_location, "San Jose");
    assert_eq!(
        plan.route_plan.destination,
        "Yellowstone National Park"
    );
    assert_eq!(plan.dining_recommendations.len(), plan.route_plan.stops().len());
    assert!(!plan.hotel_recommendations.is_empty());
}

#[tokio::test]
async fn failing_route_backend_degrades_route() {
    let rates = FailureRates {
        route: 1.0,
        ..no_failures()
    };
    let plan = live_orchestrator(rates)
        .await
        .plan_trip(&request())
        .await
        .unwrap();

    assert!(plan.route_plan.segments.is_empty());
    assert_eq!(plan.report(PlanStage::Route).unwrap().status, StageStatus::Degraded);
    assert_eq!(plan.report(PlanStage::Weather).unwrap().status, StageStatus::Completed);
    assert_eq!(plan.dining_recommendations.len(), 1);
}

#[tokio::test]
async fn reservations_over_http() {
    let orchestrator = live_orchestrator(no_failures()).await;
    let booking = orchestrator
        .reserve_room(&serde_json::from_str(
            r#"{"hotel_name": "Old Faithful Inn", "check_in": "2025-07-02", "check_out": "2025-07-04", "guests": 2}"#,
        )
        .unwrap())
        .await
        .unwrap();
    assert_eq!(booking.status, ReservationStatus::Confirmed);
    assert_eq!(booking.confirmation_code.unwrap().len(), 8);

    let rates = FailureRates {
        restaurant_reservation: 1.0,
        ..no_failures()
    };
    let table = live_orchestrator(rates)
        .await
        .reserve_table(&serde_json::from_str(
            r#"{"restaurant_name": "Canyon Lodge Dining Room", "date": "2025-07-02", "time": "19:00", "party_size": 2}"#,
        )
        .unwrap())
        .await
        .unwrap();
    assert_eq!(table.status, ReservationStatus::Failed);
    assert!(table.message.unwrap().contains("No availability for selected time"));
}
