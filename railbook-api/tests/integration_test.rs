use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use railbook_api::{app, AppState};
use railbook_catalog::repository::CatalogRepository;
use railbook_catalog::SeatInventoryManager;
use railbook_core::repository::BookingRepository;
use railbook_order::{BookingEngine, PaymentOrchestrator, SimulatedGateway};
use railbook_store::app_config::BusinessRules;
use railbook_store::{BookingLedger, StationDirectory};

fn test_app() -> Router {
    let catalog: Arc<dyn CatalogRepository> = Arc::new(StationDirectory::new());
    let store: Arc<dyn BookingRepository> = Arc::new(BookingLedger::new());
    let inventory = Arc::new(SeatInventoryManager::new());
    let payments = PaymentOrchestrator::new(Arc::new(SimulatedGateway));
    let rules = BusinessRules {
        hold_window_seconds: 900,
        booking_fee_cents: 5000,
        sweep_interval_seconds: 60,
    };
    let engine = Arc::new(BookingEngine::new(
        Arc::clone(&catalog),
        Arc::clone(&store),
        inventory,
        payments,
        rules,
    ));
    app(AppState { engine, catalog, store })
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn travel_date() -> String {
    (chrono::Utc::now().date_naive() + chrono::Duration::days(30)).to_string()
}

/// Create two stations and a train between them via the admin
/// endpoints. Returns (departure, arrival, train) ids.
async fn seed_route(app: &Router) -> (Uuid, Uuid, Uuid) {
    let mut station_ids = Vec::new();
    for name in ["Colombo Fort", "Kandy"] {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/v1/admin/stations", json!({ "name": name })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let station = read_json(response).await;
        station_ids.push(station["id"].as_str().unwrap().parse().unwrap());
    }

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/v1/admin/trains",
            json!({
                "train_number": "1015",
                "name": "Udarata Menike",
                "departure_station_id": station_ids[0],
                "arrival_station_id": station_ids[1],
                "departure_time": "06:00",
                "arrival_time": "12:30",
                "train_type": "Express",
                "base_price_cents": 100000,
                "seat_capacity": { "first": 5, "second": 10, "third": 1 }
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let train = read_json(response).await;
    let train_id = train["id"].as_str().unwrap().parse().unwrap();

    (station_ids[0], station_ids[1], train_id)
}

async fn create_booking(app: &Router, train_id: Uuid, class: &str, passengers: u32) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/v1/bookings",
            json!({
                "user_id": Uuid::new_v4(),
                "train_id": train_id,
                "travel_date": travel_date(),
                "ticket_class": class,
                "passenger_count": passengers
            }),
        ))
        .await
        .unwrap();
    let status = response.status();
    (status, read_json(response).await)
}

async fn attach_passengers(app: &Router, booking_id: &str, count: usize) -> (StatusCode, Value) {
    let passengers: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "first_name": format!("Amara{i}"),
                "last_name": "Perera",
                "id_number": format!("95123456{i}V"),
                "gender": "female"
            })
        })
        .collect();
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/v1/bookings/{booking_id}/passengers"),
            json!({
                "contact": { "email": "amara@example.com", "phone": "0771234567" },
                "passengers": passengers
            }),
        ))
        .await
        .unwrap();
    let status = response.status();
    (status, read_json(response).await)
}

async fn pay(app: &Router, booking_id: &str, card_number: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/v1/bookings/{booking_id}/pay"),
            json!({ "method": "card", "card_number": card_number }),
        ))
        .await
        .unwrap();
    let status = response.status();
    (status, read_json(response).await)
}

async fn availability(app: &Router, train_id: Uuid, class: &str) -> u32 {
    let response = app
        .clone()
        .oneshot(get_request(&format!(
            "/v1/trains/{train_id}/availability?date={}&class={class}",
            travel_date()
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    read_json(response).await["available_seats"].as_u64().unwrap() as u32
}

#[tokio::test]
async fn storefront_happy_path() {
    let app = test_app();
    let (from, to, train_id) = seed_route(&app).await;

    // Search shows the train with a quote for the requested party.
    let response = app
        .clone()
        .oneshot(get_request(&format!(
            "/v1/trains/search?from={from}&to={to}&date={}&class=second&passengers=2",
            travel_date()
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let search = read_json(response).await;
    assert_eq!(search["options"].as_array().unwrap().len(), 1);
    let option = &search["options"][0];
    assert_eq!(option["available_seats"], 10);
    assert_eq!(option["total_price_cents"], 200_000);
    assert_eq!(option["duration_minutes"], 390);

    // Draft booking reserves the seats.
    let (status, booking) = create_booking(&app, train_id, "second", 2).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(booking["status"], "DRAFT");
    let booking_id = booking["id"].as_str().unwrap().to_string();
    assert_eq!(availability(&app, train_id, "second").await, 8);

    // Passenger capture prices the booking: fare plus the flat fee.
    let (status, booking) = attach_passengers(&app, &booking_id, 2).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(booking["status"], "AWAITING_PAYMENT");
    assert_eq!(booking["total_price_cents"], 205_000);

    // Payment confirms, issues the ticket and assigns seat labels.
    let (status, booking) = pay(&app, &booking_id, "4242424242424242").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(booking["status"], "CONFIRMED");
    assert!(booking["ticket_number"].as_str().unwrap().starts_with("RB-"));
    let labels: Vec<&str> = booking["passengers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["seat_label"].as_str().unwrap())
        .collect();
    assert_eq!(labels, ["15A1", "15A2"]);

    // Confirmed seats stay claimed.
    assert_eq!(availability(&app, train_id, "second").await, 8);

    // The ticket page re-reads the booking.
    let response = app
        .clone()
        .oneshot(get_request(&format!("/v1/bookings/{booking_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The admin feed has the full transition history.
    let response = app
        .clone()
        .oneshot(get_request(&format!("/v1/admin/bookings/{booking_id}/history")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let history = read_json(response).await;
    let states: Vec<&str> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["to"].as_str().unwrap())
        .collect();
    assert_eq!(states, ["DRAFT", "AWAITING_PASSENGERS", "AWAITING_PAYMENT", "CONFIRMED"]);

    // And the booking shows up in the back-office list.
    let response = app.clone().oneshot(get_request("/v1/admin/bookings")).await.unwrap();
    let bookings = read_json(response).await;
    assert_eq!(bookings.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn declined_card_returns_402_and_releases_seats() {
    let app = test_app();
    let (_, _, train_id) = seed_route(&app).await;

    let (_, booking) = create_booking(&app, train_id, "second", 1).await;
    let booking_id = booking["id"].as_str().unwrap().to_string();
    attach_passengers(&app, &booking_id, 1).await;
    assert_eq!(availability(&app, train_id, "second").await, 9);

    let (status, booking) = pay(&app, &booking_id, "4000000000000002").await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(booking["status"], "FAILED");
    assert!(booking["ticket_number"].is_null());

    assert_eq!(availability(&app, train_id, "second").await, 10);
}

#[tokio::test]
async fn last_seat_cannot_be_sold_twice() {
    let app = test_app();
    let (_, _, train_id) = seed_route(&app).await;

    // Third class has a single seat.
    let (status, _) = create_booking(&app, train_id, "third", 1).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = create_booking(&app, train_id, "third", 1).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("insufficient seats"));
    assert_eq!(availability(&app, train_id, "third").await, 0);
}

#[tokio::test]
async fn paying_before_passenger_capture_is_a_conflict() {
    let app = test_app();
    let (_, _, train_id) = seed_route(&app).await;

    let (_, booking) = create_booking(&app, train_id, "second", 1).await;
    let booking_id = booking["id"].as_str().unwrap().to_string();

    let (status, body) = pay(&app, &booking_id, "4242424242424242").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("invalid state transition"));
}

#[tokio::test]
async fn invalid_passenger_count_is_rejected() {
    let app = test_app();
    let (_, _, train_id) = seed_route(&app).await;

    let (status, _) = create_booking(&app, train_id, "second", 0).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = create_booking(&app, train_id, "second", 11).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cancel_frees_the_hold() {
    let app = test_app();
    let (_, _, train_id) = seed_route(&app).await;

    let (_, booking) = create_booking(&app, train_id, "second", 4).await;
    let booking_id = booking["id"].as_str().unwrap().to_string();
    assert_eq!(availability(&app, train_id, "second").await, 6);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/v1/bookings/{booking_id}/cancel"),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["status"], "CANCELLED");
    assert_eq!(availability(&app, train_id, "second").await, 10);
}

#[tokio::test]
async fn unknown_booking_is_not_found() {
    let app = test_app();
    let response = app
        .clone()
        .oneshot(get_request(&format!("/v1/bookings/{}", Uuid::new_v4())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
