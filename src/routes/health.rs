use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    flights: usize,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let flights = state.schedule.lock().await.count();
    Json(HealthResponse {
        status: "ok",
        flights,
    })
}
