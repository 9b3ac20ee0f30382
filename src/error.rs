use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::FlightId;
use crate::sequence::LinkError;

/// Failures signalled by [`FlightSequence`](crate::sequence::FlightSequence)
/// and the reordering policy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SequenceError {
    #[error("No flights in the sequence")]
    EmptyCollection,

    #[error("Invalid position {position}: sequence holds {len} flights")]
    InvalidPosition { position: i64, len: usize },

    #[error("Flight {0} is not in the sequence")]
    NotFound(FlightId),

    #[error("Unknown flight identifier: {0}")]
    UnknownIdentifier(String),

    #[error("Sequence corrupted: {0}")]
    Link(#[from] LinkError),
}

/// Errors surfaced to HTTP clients.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Sequence(#[from] SequenceError),

    #[error("Flight not found: {0}")]
    FlightNotFound(String),

    #[error("Flight code already exists: {0}")]
    Conflict(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Sequence(e) => match e {
                SequenceError::EmptyCollection
                | SequenceError::NotFound(_)
                | SequenceError::UnknownIdentifier(_) => StatusCode::NOT_FOUND,
                SequenceError::InvalidPosition { .. } => StatusCode::BAD_REQUEST,
                SequenceError::Link(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::FlightNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
