//! Server configuration from the environment.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `HOST` | `127.0.0.1` |
//! | `PORT` | `8000` |
//! | `DATABASE_URL` | unset: rows live in memory and are lost on exit |
//! | `DATABASE_MAX_CONNECTIONS` | `5` |
//! | `CORS_ALLOWED_ORIGINS` | `http://localhost:5173,https://localhost:5173` |

use std::env;
use std::net::{IpAddr, SocketAddr};

use thiserror::Error;

use crate::store::db::DEFAULT_MAX_CONNECTIONS;

/// Origins of the local front-end dev server.
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:5173", "https://localhost:5173"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} is not valid: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a config from any variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let host: IpAddr = match get("HOST") {
            Some(value) => parse("HOST", value)?,
            None => defaults.bind_addr.ip(),
        };
        let port: u16 = match get("PORT") {
            Some(value) => parse("PORT", value)?,
            None => defaults.bind_addr.port(),
        };
        let max_connections = match get("DATABASE_MAX_CONNECTIONS") {
            Some(value) => parse("DATABASE_MAX_CONNECTIONS", value)?,
            None => defaults.max_connections,
        };
        let allowed_origins = match get("CORS_ALLOWED_ORIGINS") {
            Some(value) => value
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect(),
            None => defaults.allowed_origins,
        };

        Ok(Self {
            bind_addr: SocketAddr::new(host, port),
            database_url: get("DATABASE_URL"),
            max_connections,
            allowed_origins,
        })
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}
