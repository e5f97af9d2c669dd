//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;

use crate::dispatcher::PoolConfig;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL. Absent means the in-memory backend.
    pub database_url: Option<String>,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    /// Number of pool workers
    pub worker_count: usize,

    /// Bounded transaction queue capacity
    pub queue_capacity: usize,

    /// Balance cache time-to-live in seconds
    pub cache_ttl_secs: u64,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL").ok();

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS"))?;

        let worker_count = match env::var("WORKER_COUNT") {
            Ok(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidValue("WORKER_COUNT"))?,
            Err(_) => num_cpus::get(),
        };

        let queue_capacity = env::var("QUEUE_CAPACITY")
            .unwrap_or_else(|_| "100".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("QUEUE_CAPACITY"))?;

        let cache_ttl_secs = env::var("CACHE_TTL_SECS")
            .unwrap_or_else(|_| "600".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("CACHE_TTL_SECS"))?;

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        Ok(Self {
            database_url,
            database_max_connections,
            worker_count,
            queue_capacity,
            cache_ttl_secs,
            environment,
        })
    }

    /// Pool sizing derived from this configuration.
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            workers: self.worker_count,
            queue_capacity: self.queue_capacity,
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
