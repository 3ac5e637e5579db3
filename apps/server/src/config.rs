//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//! A `.env` file in the working directory is read first when present.

use serde::{Deserialize, Serialize};
use std::env;
use std::net::SocketAddr;

use ventesca_db::DbConfig;

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,

    /// HTTP port
    pub port: u16,

    /// SQLite database file
    pub database_path: String,

    /// Pool size
    pub db_max_connections: u32,

    /// Symbol shown next to amounts in reports
    pub currency_symbol: String,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ServerConfig {
            host: env::var("VENTESCA_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),

            port: env::var("VENTESCA_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("VENTESCA_PORT".to_string()))?,

            database_path: env::var("VENTESCA_DATABASE_PATH")
                .unwrap_or_else(|_| "./ventesca.db".to_string()),

            db_max_connections: env::var("VENTESCA_DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("VENTESCA_DB_MAX_CONNECTIONS".to_string()))?,

            currency_symbol: env::var("VENTESCA_CURRENCY_SYMBOL")
                .unwrap_or_else(|_| "$".to_string()),
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "VENTESCA_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        Ok(config)
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue("VENTESCA_HOST".to_string()))
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path).max_connections(self.db_max_connections)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_path: "./ventesca.db".to_string(),
            db_max_connections: 5,
            currency_symbol: "$".to_string(),
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
