use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sequence::Placement;

/// Store-assigned flight identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct FlightId(pub i64);

impl fmt::Display for FlightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Operational status of a flight. Drives where the flight sits in the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
pub enum FlightStatus {
    Scheduled,
    Emergency,
    Delayed,
}

impl FlightStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlightStatus::Scheduled => "scheduled",
            FlightStatus::Emergency => "emergency",
            FlightStatus::Delayed => "delayed",
        }
    }
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A flight record as stored in the database.
///
/// Inside the sequence a `Flight` is an immutable snapshot: changing its
/// status means removing the old value and inserting a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Flight {
    pub id: FlightId,
    pub code: String,
    pub status: FlightStatus,
    pub origin: String,
    pub destination: String,
    pub scheduled_time: DateTime<Utc>,
}

impl Flight {
    /// Copy of this flight carrying a different status.
    pub fn with_status(&self, status: FlightStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }
}

/// Request to create a new flight.
#[derive(Debug, Deserialize)]
pub struct CreateFlightRequest {
    pub code: String,
    pub status: FlightStatus,
    pub origin: String,
    pub destination: String,
    /// Defaults to the time of creation.
    pub scheduled_time: Option<DateTime<Utc>>,
    /// Put the flight at the front even when its status is not `emergency`.
    #[serde(default)]
    pub emergency: bool,
}

/// Request to place an existing flight at a position.
#[derive(Debug, Deserialize)]
pub struct InsertFlightRequest {
    pub code: String,
    pub position: i64,
}

/// Request to change a flight's status.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: FlightStatus,
}

/// Request to replace the whole order with an explicit list of codes.
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub codes: Vec<String>,
}

/// A flight together with its current position.
#[derive(Debug, Serialize)]
pub struct FlightResponse {
    pub flight: Flight,
    pub position: Option<usize>,
}

/// Response for listing the sequence front to back.
#[derive(Debug, Serialize)]
pub struct FlightListResponse {
    pub total: usize,
    pub flights: Vec<Flight>,
}

/// Response for the flight count.
#[derive(Debug, Serialize)]
pub struct TotalResponse {
    pub total: usize,
}

/// Response for a status change.
#[derive(Debug, Serialize)]
pub struct StatusChangeResponse {
    pub flight: Flight,
    pub previous_status: FlightStatus,
    pub placement: Placement,
    pub position: Option<usize>,
}
