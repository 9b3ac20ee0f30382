use std::net::SocketAddr;

use thiserror::Error;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://tarmac.db";
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";

/// Server configuration from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub database_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    /// DATABASE_URL defaults to "sqlite://tarmac.db", LISTEN_ADDR to "0.0.0.0:3000".
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let listen_addr = lookup("LISTEN_ADDR")
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("LISTEN_ADDR", "must be a valid socket address"))?;

        Ok(Config {
            listen_addr,
            database_url,
        })
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),
}
