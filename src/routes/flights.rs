use std::collections::{HashMap, HashSet};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::db;
use crate::error::{ApiError, SequenceError};
use crate::models::{
    CreateFlightRequest, Flight, FlightListResponse, FlightResponse, FlightStatus,
    InsertFlightRequest, ReorderRequest, StatusChangeResponse, TotalResponse,
    UpdateStatusRequest,
};
use crate::sequence::{self, Placement};
use crate::state::AppState;

/// Convert a client-supplied position, rejecting negatives.
fn to_position(raw: i64, len: usize) -> Result<usize, SequenceError> {
    usize::try_from(raw).map_err(|_| SequenceError::InvalidPosition { position: raw, len })
}

async fn require_flight(state: &AppState, code: &str) -> Result<Flight, ApiError> {
    db::find_by_code(&state.pool, code)
        .await?
        .ok_or_else(|| ApiError::FlightNotFound(code.to_string()))
}

/// GET /flights - All flights, front to back.
pub async fn list_flights(State(state): State<AppState>) -> Json<FlightListResponse> {
    let schedule = state.schedule.lock().await;
    Json(FlightListResponse {
        total: schedule.count(),
        flights: schedule.to_ordered_list(),
    })
}

/// GET /flights/total - Number of flights in the schedule.
pub async fn total_flights(State(state): State<AppState>) -> Json<TotalResponse> {
    Json(TotalResponse {
        total: state.schedule.lock().await.count(),
    })
}

/// POST /flights - Store a new flight and queue it by priority.
pub async fn create_flight(
    State(state): State<AppState>,
    Json(req): Json<CreateFlightRequest>,
) -> Result<(StatusCode, Json<FlightResponse>), ApiError> {
    let mut schedule = state.schedule.lock().await;

    let flight = db::insert_flight(
        &state.pool,
        &req.code,
        req.status,
        &req.origin,
        &req.destination,
        req.scheduled_time.unwrap_or_else(Utc::now),
    )
    .await
    .map_err(|e| {
        if db::is_unique_violation(&e) {
            ApiError::Conflict(req.code.clone())
        } else if db::is_check_violation(&e) {
            ApiError::BadRequest(format!("Invalid flight fields for {}", req.code))
        } else {
            ApiError::Database(e)
        }
    })?;

    let id = flight.id;
    if req.emergency || flight.status == FlightStatus::Emergency {
        schedule.push_front(flight.clone());
    } else {
        schedule.push_back(flight.clone());
    }
    let position = schedule.position_of(id);

    tracing::info!(code = %flight.code, status = %flight.status, ?position, "Flight added");
    Ok((StatusCode::CREATED, Json(FlightResponse { flight, position })))
}

/// GET /flights/next - The flight at the front.
pub async fn next_flight(State(state): State<AppState>) -> Result<Json<FlightResponse>, ApiError> {
    let schedule = state.schedule.lock().await;
    let flight = schedule.peek_front()?.clone();
    Ok(Json(FlightResponse {
        flight,
        position: Some(0),
    }))
}

/// GET /flights/last - The flight at the back.
pub async fn last_flight(State(state): State<AppState>) -> Result<Json<FlightResponse>, ApiError> {
    let schedule = state.schedule.lock().await;
    let flight = schedule.peek_back()?.clone();
    Ok(Json(FlightResponse {
        flight,
        position: Some(schedule.count() - 1),
    }))
}

/// GET /flights/{code} - A flight and its place in the schedule.
pub async fn get_flight(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<FlightResponse>, ApiError> {
    let stored = require_flight(&state, &code).await?;

    let schedule = state.schedule.lock().await;
    let flight = schedule.find_by_id(stored.id)?.clone();
    Ok(Json(FlightResponse {
        position: schedule.position_of(flight.id),
        flight,
    }))
}

/// POST /flights/insert - Place a stored flight at a position.
pub async fn insert_flight(
    State(state): State<AppState>,
    Json(req): Json<InsertFlightRequest>,
) -> Result<Json<FlightResponse>, ApiError> {
    let mut schedule = state.schedule.lock().await;

    let flight = db::find_by_code(&state.pool, &req.code)
        .await?
        .ok_or_else(|| SequenceError::UnknownIdentifier(req.code.clone()))?;
    let position = to_position(req.position, schedule.count())?;

    schedule.insert_at(flight.clone(), position)?;
    let position = schedule.position_of(flight.id);

    tracing::info!(code = %flight.code, ?position, "Flight inserted");
    Ok(Json(FlightResponse { flight, position }))
}

/// DELETE /flights/position/{position} - Remove the flight at a position and delete it.
pub async fn remove_flight_at(
    State(state): State<AppState>,
    Path(position): Path<i64>,
) -> Result<Json<FlightResponse>, ApiError> {
    let mut schedule = state.schedule.lock().await;

    let position = to_position(position, schedule.count())?;
    let flight = schedule.remove_at(position)?;

    if let Err(e) = db::delete_flight(&state.pool, flight.id).await {
        // Keep the schedule in line with the store.
        if let Err(rollback) = schedule.insert_at(flight, position) {
            tracing::error!("Failed to restore flight at {}: {}", position, rollback);
        }
        return Err(e.into());
    }

    tracing::info!(code = %flight.code, position, "Flight removed");
    Ok(Json(FlightResponse {
        flight,
        position: Some(position),
    }))
}

/// PUT /flights/{code}/status - Change status and reorder by priority.
pub async fn update_status(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<StatusChangeResponse>, ApiError> {
    let mut schedule = state.schedule.lock().await;

    let stored = require_flight(&state, &code).await?;
    let previous = stored.status;
    let updated = stored.with_status(req.status);

    if previous == req.status {
        return Ok(Json(StatusChangeResponse {
            position: schedule.position_of(updated.id),
            flight: updated,
            previous_status: previous,
            placement: Placement::Unchanged,
        }));
    }

    if !db::update_status(&state.pool, stored.id, req.status).await? {
        return Err(ApiError::FlightNotFound(code));
    }

    let placement = match sequence::apply_status_change(&mut schedule, updated.clone(), previous)
    {
        Ok(placement) => placement,
        Err(e) => {
            if let Err(rollback) = db::update_status(&state.pool, stored.id, previous).await {
                tracing::error!("Failed to restore status of {}: {}", code, rollback);
            }
            return Err(e.into());
        }
    };

    tracing::info!(code = %code, from = %previous, to = %req.status, ?placement, "Flight status changed");
    Ok(Json(StatusChangeResponse {
        position: schedule.position_of(updated.id),
        flight: updated,
        previous_status: previous,
        placement,
    }))
}

/// PUT /flights/order - Replace the schedule with an explicit order of codes.
pub async fn reorder_flights(
    State(state): State<AppState>,
    Json(req): Json<ReorderRequest>,
) -> Result<Json<FlightListResponse>, ApiError> {
    let mut seen = HashSet::new();
    if let Some(repeated) = req.codes.iter().find(|code| !seen.insert(code.as_str())) {
        return Err(ApiError::BadRequest(format!(
            "Flight code listed more than once: {}",
            repeated
        )));
    }

    let mut schedule = state.schedule.lock().await;

    let mut order = Vec::with_capacity(req.codes.len());
    let mut known = HashMap::with_capacity(req.codes.len());
    for code in &req.codes {
        let flight = db::find_by_code(&state.pool, code)
            .await?
            .ok_or_else(|| SequenceError::UnknownIdentifier(code.clone()))?;
        order.push(flight.id);
        known.insert(flight.id, flight);
    }

    *schedule = sequence::rebuild(&order, &known)?;

    tracing::info!("Schedule reordered with {} flights", schedule.count());
    Ok(Json(FlightListResponse {
        total: schedule.count(),
        flights: schedule.to_ordered_list(),
    }))
}
