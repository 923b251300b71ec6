use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use skyfare_api::state::{AppState, AuthConfig};
use skyfare_api::app;
use skyfare_booking::BookingCoordinator;
use skyfare_core::flight::Flight;
use skyfare_core::memory::MemoryStore;
use skyfare_core::store::FlightStore;
use skyfare_pricing::{PricingService, WindowConfig};
use skyfare_store::app_config::WalletRules;

fn seed_flight(code: &str, from: &str, to: &str, base_price: i64) -> Flight {
    Flight {
        id: Uuid::new_v4(),
        flight_code: code.to_string(),
        airline: "IndiGo".to_string(),
        departure_city: from.to_string(),
        arrival_city: to.to_string(),
        departure_time: "06:00 AM".to_string(),
        arrival_time: "08:15 AM".to_string(),
        base_price,
    }
}

async fn test_app(starting_credit: i64) -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let flights = store.clone() as Arc<dyn FlightStore>;

    let pricing = Arc::new(PricingService::new(flights.clone(), WindowConfig::default()));
    let coordinator = Arc::new(BookingCoordinator::new(
        flights.clone(),
        store.clone(),
        store.clone(),
        pricing.clone(),
    ));

    let state = AppState {
        users: store.clone(),
        flights,
        wallets: store.clone(),
        bookings: store.clone(),
        pricing,
        coordinator,
        auth: AuthConfig { secret: "test-secret".to_string(), expiration: 3600 },
        wallet_rules: WalletRules { starting_credit },
    };

    (app(state), store)
}

async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn register(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/v1/auth/register",
        None,
        Some(json!({ "name": "Asha Rao", "email": email })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let (app, _) = test_app(50_000).await;
    let (status, _) = send(&app, Method::GET, "/v1/flights", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_login_and_wallet_seed() {
    let (app, _) = test_app(50_000).await;
    let token = register(&app, "asha@example.com").await;

    let (status, wallet) = send(&app, Method::GET, "/v1/wallet", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(wallet["balance"], 50_000);
    assert_eq!(wallet["transactions"][0]["type"], "credit");
    assert_eq!(wallet["transactions"][0]["amount"], 50_000);

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/auth/login",
        None,
        Some(json!({ "email": "asha@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some());

    let (status, _) = send(
        &app,
        Method::POST,
        "/v1/auth/register",
        None,
        Some(json!({ "name": "Again", "email": "asha@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_search_returns_quotes() {
    let (app, store) = test_app(50_000).await;
    store.insert_flight(seed_flight("AI101", "Mumbai", "Delhi", 2_500)).await;
    store.insert_flight(seed_flight("SG202", "Delhi", "Bangalore", 2_800)).await;
    let token = register(&app, "quotes@example.com").await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/v1/flights?departure_city=mum",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    let flight = &body["flights"][0];
    assert_eq!(flight["flight_code"], "AI101");
    assert_eq!(flight["base_price"], 2_500);
    assert_eq!(flight["current_price"], 2_500);
    assert_eq!(flight["is_surge_active"], false);
    assert!(flight.get("time_until_reset_ms").is_none());
}

#[tokio::test]
async fn test_cities_endpoint() {
    let (app, store) = test_app(50_000).await;
    store.insert_flight(seed_flight("AI101", "Mumbai", "Delhi", 2_500)).await;
    store.insert_flight(seed_flight("IG303", "Bangalore", "Mumbai", 2_300)).await;
    let token = register(&app, "cities@example.com").await;

    let (status, body) = send(&app, Method::GET, "/v1/flights/cities", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["departure_cities"], json!(["Bangalore", "Mumbai"]));
    assert_eq!(body["arrival_cities"], json!(["Delhi", "Mumbai"]));
}

#[tokio::test]
async fn test_booking_flow_with_surge() {
    let (app, store) = test_app(50_000).await;
    let flight = seed_flight("AI101", "Mumbai", "Delhi", 2_000);
    let flight_id = flight.id;
    store.insert_flight(flight).await;
    let token = register(&app, "booker@example.com").await;

    // First three bookings at the base price.
    for _ in 0..3 {
        let (status, body) = send(
            &app,
            Method::POST,
            "/v1/bookings",
            Some(&token),
            Some(json!({ "flight_id": flight_id, "passenger_name": "Asha Rao" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["booking"]["final_price"], 2_000);
        assert_eq!(body["booking"]["status"], "confirmed");
    }

    // The fourth rides the surge.
    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/bookings",
        Some(&token),
        Some(json!({ "flight_id": flight_id, "passenger_name": "Asha Rao" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["booking"]["final_price"], 2_200);
    assert_eq!(body["wallet_balance"], 50_000 - 3 * 2_000 - 2_200);
    let pnr = body["booking"]["pnr"].as_str().unwrap();
    assert_eq!(pnr.len(), 6);

    // The flight now quotes the surge price to everyone.
    let (_, flight_view) = send(
        &app,
        Method::GET,
        &format!("/v1/flights/{flight_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(flight_view["is_surge_active"], true);
    assert_eq!(flight_view["current_price"], 2_200);
    assert!(flight_view["time_until_reset_ms"].as_i64().unwrap() > 0);

    // History lists all four, and each booking is fetchable by id.
    let (status, history) = send(&app, Method::GET, "/v1/bookings", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["count"], 4);
    let booking_id = history["bookings"][0]["id"].as_str().unwrap();
    let (status, booking) = send(
        &app,
        Method::GET,
        &format!("/v1/bookings/{booking_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(booking["flight_details"]["flight_code"], "AI101");
}

#[tokio::test]
async fn test_insufficient_funds_reports_amounts() {
    let (app, store) = test_app(1_000).await;
    let flight = seed_flight("SG202", "Delhi", "Bangalore", 2_200);
    let flight_id = flight.id;
    store.insert_flight(flight).await;
    let token = register(&app, "broke@example.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/bookings",
        Some(&token),
        Some(json!({ "flight_id": flight_id, "passenger_name": "Asha Rao" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["required"], 2_200);
    assert_eq!(body["available"], 1_000);

    // No mutation: wallet untouched, no bookings.
    let (_, wallet) = send(&app, Method::GET, "/v1/wallet", Some(&token), None).await;
    assert_eq!(wallet["balance"], 1_000);
    let (_, history) = send(&app, Method::GET, "/v1/bookings", Some(&token), None).await;
    assert_eq!(history["count"], 0);
}

#[tokio::test]
async fn test_booking_other_users_is_hidden() {
    let (app, store) = test_app(50_000).await;
    let flight = seed_flight("IG303", "Bangalore", "Mumbai", 2_300);
    let flight_id = flight.id;
    store.insert_flight(flight).await;

    let owner = register(&app, "owner@example.com").await;
    let other = register(&app, "other@example.com").await;

    let (_, created) = send(
        &app,
        Method::POST,
        "/v1/bookings",
        Some(&owner),
        Some(json!({ "flight_id": flight_id, "passenger_name": "Asha Rao" })),
    )
    .await;
    let booking_id = created["booking"]["id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/v1/bookings/{booking_id}"),
        Some(&other),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_topup_validation_and_credit() {
    let (app, _) = test_app(50_000).await;
    let token = register(&app, "topup@example.com").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/v1/wallet/topup",
        Some(&token),
        Some(json!({ "amount": -5 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/wallet/topup",
        Some(&token),
        Some(json!({ "amount": 2_500 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], 52_500);
}

#[tokio::test]
async fn test_unknown_flight_booking_is_not_found() {
    let (app, _) = test_app(50_000).await;
    let token = register(&app, "lost@example.com").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/v1/bookings",
        Some(&token),
        Some(json!({ "flight_id": Uuid::new_v4(), "passenger_name": "Asha Rao" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
