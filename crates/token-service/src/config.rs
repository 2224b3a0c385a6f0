//! Token service configuration.
//!
//! Configuration is loaded from environment variables. Sensitive fields are
//! redacted in Debug output.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default HTTP bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8090";

/// Default maximum database connections.
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Default per-statement database timeout in seconds.
pub const DEFAULT_DB_QUERY_TIMEOUT_SECONDS: u32 = 5;

/// Default HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

/// Which repository backend the service runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(ConfigError::InvalidStore(format!(
                "TOKEN_STORE must be 'postgres' or 'memory', got '{}'",
                other
            ))),
        }
    }
}

/// Token service configuration.
#[derive(Clone)]
pub struct Config {
    /// Repository backend (default: postgres).
    pub store: StoreBackend,

    /// PostgreSQL connection URL. Required for the postgres backend.
    pub database_url: Option<String>,

    /// Server bind address (default: "0.0.0.0:8090").
    pub bind_address: String,

    /// Maximum pooled database connections.
    pub db_max_connections: u32,

    /// Statement timeout applied to every database query.
    pub db_query_timeout_seconds: u32,

    /// Timeout for a whole HTTP request.
    pub request_timeout_seconds: u64,

    /// Seconds to keep serving after a shutdown signal.
    pub drain_seconds: u64,

    /// Key for a cluster-admin token seeded into the memory store.
    pub bootstrap_admin_key: Option<String>,
}

/// Custom Debug implementation that redacts sensitive fields.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("store", &self.store)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("bind_address", &self.bind_address)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_query_timeout_seconds", &self.db_query_timeout_seconds)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .field("drain_seconds", &self.drain_seconds)
            .field(
                "bootstrap_admin_key",
                &self.bootstrap_admin_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid store configuration: {0}")]
    InvalidStore(String),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

/// Parse an optional positive integer variable.
fn parse_positive<T>(
    vars: &HashMap<String, String>,
    name: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + Default,
    T::Err: fmt::Display,
{
    let Some(value_str) = vars.get(name) else {
        return Ok(default);
    };

    let value: T = value_str.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        name: name.to_string(),
        reason: format!("must be a valid positive integer, got '{}': {}", value_str, e),
    })?;

    if value <= T::default() {
        return Err(ConfigError::InvalidValue {
            name: name.to_string(),
            reason: "must be greater than 0".to_string(),
        });
    }

    Ok(value)
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let store = match vars.get("TOKEN_STORE") {
            Some(value) => value.parse()?,
            None => StoreBackend::Postgres,
        };

        let database_url = vars.get("DATABASE_URL").cloned();
        if store == StoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::MissingEnvVar("DATABASE_URL".to_string()));
        }

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let db_max_connections =
            parse_positive(vars, "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?;
        let db_query_timeout_seconds = parse_positive(
            vars,
            "DB_QUERY_TIMEOUT_SECONDS",
            DEFAULT_DB_QUERY_TIMEOUT_SECONDS,
        )?;
        let request_timeout_seconds = parse_positive(
            vars,
            "REQUEST_TIMEOUT_SECONDS",
            DEFAULT_REQUEST_TIMEOUT_SECONDS,
        )?;

        // Zero is a valid drain period (skip draining)
        let drain_seconds = match vars.get("DRAIN_SECONDS") {
            Some(value_str) => {
                value_str
                    .parse::<u64>()
                    .map_err(|e| ConfigError::InvalidValue {
                        name: "DRAIN_SECONDS".to_string(),
                        reason: format!("must be a valid integer, got '{}': {}", value_str, e),
                    })?
            }
            None => 0,
        };

        let bootstrap_admin_key = vars
            .get("BOOTSTRAP_ADMIN_KEY")
            .filter(|k| !k.is_empty())
            .cloned();

        Ok(Config {
            store,
            database_url,
            bind_address,
            db_max_connections,
            db_query_timeout_seconds,
            request_timeout_seconds,
            drain_seconds,
            bootstrap_admin_key,
        })
    }
}
