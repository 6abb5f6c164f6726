//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `MILKROUND_DATABASE_URL` - `SQLite` connection string (default: `sqlite:milkround.db`)
//! - `MILKROUND_HOST` - Bind address (default: 127.0.0.1)
//! - `MILKROUND_PORT` - Listen port (default: 3000)
//! - `MILKROUND_BASE_URL` - Public URL (default: `http://localhost:3000`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Milkround application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// `SQLite` connection string (may embed a path outside the repo)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the service
    pub base_url: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry transaction sample rate
    pub sentry_traces_sample_rate: f32,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if a set variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = SecretString::from(
            std::env::var("MILKROUND_DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:milkround.db".to_owned()),
        );

        let host = parse_env_or("MILKROUND_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = parse_env_or("MILKROUND_PORT", 3000)?;

        let base_url = std::env::var("MILKROUND_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_owned());

        let sentry_dsn = std::env::var("SENTRY_DSN").ok();
        let sentry_environment = std::env::var("SENTRY_ENVIRONMENT").ok();
        let sentry_sample_rate = parse_env_or("SENTRY_SAMPLE_RATE", 1.0)?;
        let sentry_traces_sample_rate = parse_env_or("SENTRY_TRACES_SAMPLE_RATE", 0.0)?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Configuration suitable for tests: in-memory database, local bind.
    #[must_use]
    pub fn for_tests() -> Self {
        Self {
            database_url: SecretString::from("sqlite::memory:"),
            host: IpAddr::from([127, 0, 0, 1]),
            port: 0,
            base_url: "http://localhost".to_owned(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    /// The socket address to bind the server to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the public base URL is served over HTTPS (session cookies are
    /// marked secure only then).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

/// Parse an optional environment variable, falling back to a default.
fn parse_env_or<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidEnvVar(name.to_owned(), raw)),
        Err(_) => Ok(default),
    }
}
