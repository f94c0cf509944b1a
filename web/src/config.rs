//! Service configuration.
//!
//! Values come from the environment; nothing is hardcoded in the binary.

use anyhow::Context;

/// Default bind address when `BIND_ADDR` is not set.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Runtime configuration for the service binary.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Address the HTTP listener binds to.
    pub bind_addr: String,
}

impl AppConfig {
    /// Read configuration from the environment.
    ///
    /// `DATABASE_URL` is required; `BIND_ADDR` defaults to
    /// [`DEFAULT_BIND_ADDR`].
    ///
    /// # Errors
    ///
    /// Returns an error when `DATABASE_URL` is missing.
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        Ok(Self {
            database_url,
            bind_addr,
        })
    }
}
