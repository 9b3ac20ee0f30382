use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

use crate::models::{Flight, FlightId, FlightStatus};

const FLIGHT_COLUMNS: &str = "id, code, status, origin, destination, scheduled_time";

/// Initialize database connection pool with recommended pragmas.
///
/// In-memory databases are private to a connection, so they get a single
/// long-lived connection.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(5))
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

    let pool_options = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(10)
    };

    pool_options.connect_with(options).await
}

/// Run database migrations.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(include_str!("../migrations/001_create_flights.sql"))
        .execute(pool)
        .await?;
    Ok(())
}

/// All flights in load order: by scheduled time, ties broken by id.
pub async fn load_flights(pool: &SqlitePool) -> Result<Vec<Flight>, sqlx::Error> {
    sqlx::query_as::<_, Flight>(&format!(
        "SELECT {FLIGHT_COLUMNS} FROM flights ORDER BY scheduled_time ASC, id ASC"
    ))
    .fetch_all(pool)
    .await
}

/// Insert a new flight and return it with its assigned id.
pub async fn insert_flight(
    pool: &SqlitePool,
    code: &str,
    status: FlightStatus,
    origin: &str,
    destination: &str,
    scheduled_time: DateTime<Utc>,
) -> Result<Flight, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO flights (code, status, origin, destination, scheduled_time)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(code)
    .bind(status)
    .bind(origin)
    .bind(destination)
    .bind(scheduled_time)
    .execute(pool)
    .await?;

    let id = FlightId(result.last_insert_rowid());
    find_by_id(pool, id).await?.ok_or(sqlx::Error::RowNotFound)
}

pub async fn find_by_id(pool: &SqlitePool, id: FlightId) -> Result<Option<Flight>, sqlx::Error> {
    sqlx::query_as::<_, Flight>(&format!("SELECT {FLIGHT_COLUMNS} FROM flights WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_code(pool: &SqlitePool, code: &str) -> Result<Option<Flight>, sqlx::Error> {
    sqlx::query_as::<_, Flight>(&format!(
        "SELECT {FLIGHT_COLUMNS} FROM flights WHERE code = ?"
    ))
    .bind(code)
    .fetch_optional(pool)
    .await
}

/// Set a flight's status. Returns false if no such flight exists.
pub async fn update_status(
    pool: &SqlitePool,
    id: FlightId,
    status: FlightStatus,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE flights SET status = ? WHERE id = ?")
        .bind(status)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Delete a flight. Returns false if no such flight exists.
pub async fn delete_flight(pool: &SqlitePool, id: FlightId) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM flights WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Whether an error is a violation of the unique `code` constraint.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}

/// Whether an error is a violation of a CHECK constraint.
pub fn is_check_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_check_violation())
}
