use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use tarmac::{create_router, db, init_pool, run_migrations, AppState, FlightSequence, FlightStatus};

/// Create a test app with in-memory database and an empty schedule.
async fn create_test_app() -> Router {
    let pool = init_pool("sqlite::memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();

    let state = AppState::new(pool, FlightSequence::new());
    create_router(state)
}

/// Send a request and return status plus parsed JSON body.
async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    // Extractor rejections from axum come back as plain text.
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, json)
}

async fn create_flight(app: &Router, code: &str, status: &str, hour: u32) -> Value {
    let (status_code, json) = send(
        app,
        "POST",
        "/flights",
        Some(json!({
            "code": code,
            "status": status,
            "origin": "OSL",
            "destination": "BGO",
            "scheduled_time": format!("2026-03-01T{:02}:00:00Z", hour),
        })),
    )
    .await;
    assert_eq!(status_code, StatusCode::CREATED, "creating {}: {}", code, json);
    json
}

async fn listed_codes(app: &Router) -> Vec<String> {
    let (status, json) = send(app, "GET", "/flights", None).await;
    assert_eq!(status, StatusCode::OK);
    json["flights"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["code"].as_str().unwrap().to_string())
        .collect()
}

/// App holding scheduled flights A1, B2, C3 in that order.
async fn create_app_with_three() -> Router {
    let app = create_test_app().await;
    create_flight(&app, "A1", "scheduled", 8).await;
    create_flight(&app, "B2", "scheduled", 9).await;
    create_flight(&app, "C3", "scheduled", 10).await;
    app
}

// ============================================================================
// Health and listing
// ============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app().await;

    let (status, json) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["flights"], 0);
}

#[tokio::test]
async fn test_list_empty() {
    let app = create_test_app().await;

    let (status, json) = send(&app, "GET", "/flights", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 0);
    assert_eq!(json["flights"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_next_and_last_on_empty_schedule() {
    let app = create_test_app().await;

    let (status, json) = send(&app, "GET", "/flights/next", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "No flights in the sequence");

    let (status, _) = send(&app, "GET", "/flights/last", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Creating flights
// ============================================================================

#[tokio::test]
async fn test_create_flight() {
    let app = create_test_app().await;

    let json = create_flight(&app, "SK4035", "scheduled", 9).await;

    assert_eq!(json["flight"]["id"], 1);
    assert_eq!(json["flight"]["code"], "SK4035");
    assert_eq!(json["flight"]["status"], "scheduled");
    assert_eq!(json["flight"]["origin"], "OSL");
    assert_eq!(json["flight"]["destination"], "BGO");
    assert_eq!(json["position"], 0);

    let (_, total) = send(&app, "GET", "/flights/total", None).await;
    assert_eq!(total["total"], 1);
}

#[tokio::test]
async fn test_single_flight_is_next_and_last() {
    let app = create_test_app().await;
    create_flight(&app, "SK4035", "delayed", 9).await;

    let (_, next) = send(&app, "GET", "/flights/next", None).await;
    let (_, last) = send(&app, "GET", "/flights/last", None).await;

    assert_eq!(next["flight"]["code"], "SK4035");
    assert_eq!(last["flight"]["code"], "SK4035");
}

#[tokio::test]
async fn test_emergency_goes_to_front() {
    let app = create_app_with_three().await;

    let json = create_flight(&app, "EM1", "emergency", 11).await;
    assert_eq!(json["position"], 0);

    assert_eq!(listed_codes(&app).await, vec!["EM1", "A1", "B2", "C3"]);

    let (_, next) = send(&app, "GET", "/flights/next", None).await;
    assert_eq!(next["flight"]["code"], "EM1");
    let (_, last) = send(&app, "GET", "/flights/last", None).await;
    assert_eq!(last["flight"]["code"], "C3");
    assert_eq!(last["position"], 3);
}

#[tokio::test]
async fn test_emergency_flag_goes_to_front() {
    let app = create_app_with_three().await;

    let (status, json) = send(
        &app,
        "POST",
        "/flights",
        Some(json!({
            "code": "DY1",
            "status": "scheduled",
            "origin": "TRD",
            "destination": "OSL",
            "emergency": true
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["position"], 0);
    assert_eq!(listed_codes(&app).await, vec!["DY1", "A1", "B2", "C3"]);
}

#[tokio::test]
async fn test_create_duplicate_code_conflicts() {
    let app = create_app_with_three().await;

    let (status, json) = send(
        &app,
        "POST",
        "/flights",
        Some(json!({
            "code": "B2",
            "status": "delayed",
            "origin": "OSL",
            "destination": "SVG"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "Flight code already exists: B2");
    assert_eq!(listed_codes(&app).await, vec!["A1", "B2", "C3"]);
}

#[tokio::test]
async fn test_create_with_unknown_status_is_rejected() {
    let app = create_test_app().await;

    let (status, _) = send(
        &app,
        "POST",
        "/flights",
        Some(json!({
            "code": "XX1",
            "status": "cancelled",
            "origin": "OSL",
            "destination": "BGO"
        })),
    )
    .await;

    assert!(status.is_client_error());
    assert_eq!(listed_codes(&app).await, Vec::<String>::new());
}

// ============================================================================
// Lookup
// ============================================================================

#[tokio::test]
async fn test_get_flight_by_code() {
    let app = create_app_with_three().await;

    let (status, json) = send(&app, "GET", "/flights/B2", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["flight"]["code"], "B2");
    assert_eq!(json["position"], 1);

    let (status, json) = send(&app, "GET", "/flights/ZZ9", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Flight not found: ZZ9");
}

// ============================================================================
// Positional insert and removal
// ============================================================================

#[tokio::test]
async fn test_insert_moves_existing_flight() {
    let app = create_app_with_three().await;

    let (status, json) = send(
        &app,
        "POST",
        "/flights/insert",
        Some(json!({ "code": "C3", "position": 0 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["position"], 0);
    assert_eq!(listed_codes(&app).await, vec!["C3", "A1", "B2"]);

    let (_, total) = send(&app, "GET", "/flights/total", None).await;
    assert_eq!(total["total"], 3);
}

#[tokio::test]
async fn test_insert_at_end_appends() {
    let app = create_app_with_three().await;

    let (status, _) = send(
        &app,
        "POST",
        "/flights/insert",
        Some(json!({ "code": "A1", "position": 3 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed_codes(&app).await, vec!["B2", "C3", "A1"]);
}

#[tokio::test]
async fn test_insert_unknown_code() {
    let app = create_app_with_three().await;

    let (status, json) = send(
        &app,
        "POST",
        "/flights/insert",
        Some(json!({ "code": "NOPE", "position": 0 })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Unknown flight identifier: NOPE");
}

#[tokio::test]
async fn test_insert_invalid_position_leaves_order() {
    let app = create_app_with_three().await;

    for position in [-1, 4, 100] {
        let (status, _) = send(
            &app,
            "POST",
            "/flights/insert",
            Some(json!({ "code": "A1", "position": position })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "position {}", position);
    }

    assert_eq!(listed_codes(&app).await, vec!["A1", "B2", "C3"]);
}

#[tokio::test]
async fn test_remove_at_position_deletes_flight() {
    let app = create_app_with_three().await;

    let (status, json) = send(&app, "DELETE", "/flights/position/1", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["flight"]["code"], "B2");
    assert_eq!(json["position"], 1);
    assert_eq!(listed_codes(&app).await, vec!["A1", "C3"]);

    // Gone from the store as well
    let (status, _) = send(&app, "GET", "/flights/B2", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_remove_invalid_position_leaves_order() {
    let app = create_app_with_three().await;

    let (status, json) = send(&app, "DELETE", "/flights/position/3", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid position 3: sequence holds 3 flights");

    let (status, _) = send(&app, "DELETE", "/flights/position/-1", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(listed_codes(&app).await, vec!["A1", "B2", "C3"]);
}

#[tokio::test]
async fn test_remove_then_insert_restores_order() {
    let app = create_app_with_three().await;

    // Removal deletes from the store, so recreate before re-inserting.
    send(&app, "DELETE", "/flights/position/1", None).await;
    create_flight(&app, "B2", "scheduled", 9).await;
    let (status, _) = send(
        &app,
        "POST",
        "/flights/insert",
        Some(json!({ "code": "B2", "position": 1 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed_codes(&app).await, vec!["A1", "B2", "C3"]);
}

// ============================================================================
// Status changes
// ============================================================================

#[tokio::test]
async fn test_status_change_reorders_by_priority() {
    let app = create_app_with_three().await;

    let (status, json) = send(
        &app,
        "PUT",
        "/flights/B2/status",
        Some(json!({ "status": "emergency" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["placement"]["kind"], "front");
    assert_eq!(json["previous_status"], "scheduled");
    assert_eq!(json["flight"]["status"], "emergency");
    assert_eq!(json["position"], 0);
    assert_eq!(listed_codes(&app).await, vec!["B2", "A1", "C3"]);

    let (_, json) = send(
        &app,
        "PUT",
        "/flights/A1/status",
        Some(json!({ "status": "delayed" })),
    )
    .await;
    assert_eq!(json["placement"]["kind"], "back");
    assert_eq!(listed_codes(&app).await, vec!["B2", "C3", "A1"]);

    let (_, json) = send(
        &app,
        "PUT",
        "/flights/B2/status",
        Some(json!({ "status": "scheduled" })),
    )
    .await;
    assert_eq!(json["placement"], json!({ "kind": "restored", "position": 0 }));
    assert_eq!(listed_codes(&app).await, vec!["B2", "C3", "A1"]);

    // Persisted status survives in lookups
    let (_, json) = send(&app, "GET", "/flights/A1", None).await;
    assert_eq!(json["flight"]["status"], "delayed");
}

#[tokio::test]
async fn test_status_change_same_status_is_unchanged() {
    let app = create_app_with_three().await;

    let (status, json) = send(
        &app,
        "PUT",
        "/flights/C3/status",
        Some(json!({ "status": "scheduled" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["placement"]["kind"], "unchanged");
    assert_eq!(json["position"], 2);
    assert_eq!(listed_codes(&app).await, vec!["A1", "B2", "C3"]);
}

#[tokio::test]
async fn test_status_change_unknown_flight() {
    let app = create_app_with_three().await;

    let (status, _) = send(
        &app,
        "PUT",
        "/flights/NOPE/status",
        Some(json!({ "status": "emergency" })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Full reorder
// ============================================================================

#[tokio::test]
async fn test_reorder_replaces_schedule() {
    let app = create_app_with_three().await;

    let (status, json) = send(
        &app,
        "PUT",
        "/flights/order",
        Some(json!({ "codes": ["C3", "A1"] })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 2);
    assert_eq!(listed_codes(&app).await, vec!["C3", "A1"]);
}

#[tokio::test]
async fn test_reorder_with_unknown_code_leaves_schedule() {
    let app = create_app_with_three().await;

    let (status, json) = send(
        &app,
        "PUT",
        "/flights/order",
        Some(json!({ "codes": ["C3", "GHOST", "A1"] })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Unknown flight identifier: GHOST");
    assert_eq!(listed_codes(&app).await, vec!["A1", "B2", "C3"]);
}

#[tokio::test]
async fn test_reorder_with_repeated_code_is_rejected() {
    let app = create_app_with_three().await;

    let (status, _) = send(
        &app,
        "PUT",
        "/flights/order",
        Some(json!({ "codes": ["C3", "A1", "C3"] })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(listed_codes(&app).await, vec!["A1", "B2", "C3"]);
}

// ============================================================================
// Startup load
// ============================================================================

#[tokio::test]
async fn test_load_orders_by_scheduled_time() {
    let pool = init_pool("sqlite::memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();

    let at = |hour| Utc.with_ymd_and_hms(2026, 3, 1, hour, 0, 0).unwrap();
    db::insert_flight(&pool, "LATE", FlightStatus::Scheduled, "OSL", "BGO", at(20))
        .await
        .unwrap();
    db::insert_flight(&pool, "EARLY", FlightStatus::Emergency, "OSL", "TOS", at(5))
        .await
        .unwrap();
    db::insert_flight(&pool, "MID", FlightStatus::Delayed, "BGO", "SVG", at(12))
        .await
        .unwrap();

    let app = create_router(AppState::load(pool).await.unwrap());

    assert_eq!(listed_codes(&app).await, vec!["EARLY", "MID", "LATE"]);
}
