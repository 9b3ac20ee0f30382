use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::db;
use crate::sequence::FlightSequence;

/// Application state shared across handlers.
///
/// `schedule` is the single live flight order. Handlers hold its lock across
/// both the database write and the sequence update, so the two are applied
/// together and a full reorder swaps in a new sequence in one step.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub schedule: Arc<Mutex<FlightSequence>>,
}

impl AppState {
    pub fn new(pool: SqlitePool, schedule: FlightSequence) -> Self {
        Self {
            pool,
            schedule: Arc::new(Mutex::new(schedule)),
        }
    }

    /// Build state with the sequence populated from the database in load order.
    pub async fn load(pool: SqlitePool) -> Result<Self, sqlx::Error> {
        let flights = db::load_flights(&pool).await?;
        let schedule: FlightSequence = flights.into_iter().collect();
        tracing::info!("Loaded {} flights into the schedule", schedule.count());
        Ok(Self::new(pool, schedule))
    }
}
