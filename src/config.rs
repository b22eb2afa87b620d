// Runtime configuration loaded from the environment

use std::time::Duration;

use crate::client::cache::DEFAULT_CACHE_TTL;
use crate::search::session::{DEFAULT_SESSION_CAPACITY, DEFAULT_SESSION_IDLE_TTL};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_UPSTREAM_API_URL: &str = "http://localhost:8000/api/";
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set in environment")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Gateway settings
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Base URL of the remote Hotel/Search and Booking APIs
    pub upstream_api_url: String,
    pub upstream_timeout: Duration,
    /// Shared HS256 secret of the identity provider
    pub jwt_secret: String,
    pub cache_ttl: Duration,
    /// Most search sessions held in memory
    pub session_capacity: usize,
    pub session_idle_ttl: Duration,
}

impl AppConfig {
    /// Reads the process environment (after `.env` has been loaded)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let jwt_secret = var("IDENTITY_JWT_SECRET").ok_or(ConfigError::Missing("IDENTITY_JWT_SECRET"))?;

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or(var("PORT"), "PORT", DEFAULT_PORT)?,
            upstream_api_url: var("UPSTREAM_API_URL").unwrap_or_else(|| DEFAULT_UPSTREAM_API_URL.to_string()),
            upstream_timeout: Duration::from_secs(parse_or(
                var("UPSTREAM_TIMEOUT_SECS"),
                "UPSTREAM_TIMEOUT_SECS",
                DEFAULT_UPSTREAM_TIMEOUT_SECS,
            )?),
            jwt_secret,
            cache_ttl: Duration::from_secs(parse_or(var("CACHE_TTL_SECS"), "CACHE_TTL_SECS", DEFAULT_CACHE_TTL.as_secs())?),
            session_capacity: parse_or(var("SESSION_CAPACITY"), "SESSION_CAPACITY", DEFAULT_SESSION_CAPACITY)?,
            session_idle_ttl: Duration::from_secs(parse_or(
                var("SESSION_IDLE_SECS"),
                "SESSION_IDLE_SECS",
                DEFAULT_SESSION_IDLE_TTL.as_secs(),
            )?),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, name: &'static str, default: T) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { name, value }),
    }
}
