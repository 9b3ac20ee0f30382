pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod sequence;
pub mod state;

pub use config::Config;
pub use db::{init_pool, run_migrations};
pub use error::{ApiError, SequenceError};
pub use models::{Flight, FlightId, FlightStatus};
pub use routes::create_router;
pub use sequence::{FlightSequence, Placement};
pub use state::AppState;
