pub mod flights;
pub mod health;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Ordered schedule
        .route("/flights", get(flights::list_flights).post(flights::create_flight))
        .route("/flights/total", get(flights::total_flights))
        .route("/flights/next", get(flights::next_flight))
        .route("/flights/last", get(flights::last_flight))
        .route("/flights/insert", post(flights::insert_flight))
        .route("/flights/order", put(flights::reorder_flights))
        .route(
            "/flights/position/{position}",
            delete(flights::remove_flight_at),
        )
        .route("/flights/{code}", get(flights::get_flight))
        .route("/flights/{code}/status", put(flights::update_status))
        // Health check
        .merge(health::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
