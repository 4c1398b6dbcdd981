use chrono::Duration;
use std::net::SocketAddr;
use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "sqlite://servers.db?mode=rwc";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_TOKEN_TTL_HOURS: i64 = 168;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub secret_key: String,
    pub bind_addr: SocketAddr,
    pub token_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let secret_key = lookup("SECRET_KEY")
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("SECRET_KEY".to_string()))?;

        let bind_addr = parse_var(&lookup, "BIND_ADDR", DEFAULT_BIND_ADDR)?;
        let ttl_hours: i64 =
            parse_var(&lookup, "TOKEN_TTL_HOURS", &DEFAULT_TOKEN_TTL_HOURS.to_string())?;

        Ok(Self {
            database_url,
            secret_key,
            bind_addr,
            token_ttl: Duration::hours(ttl_hours),
        })
    }
}

fn parse_var<F, T>(lookup: &F, name: &str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let value = lookup(name).unwrap_or_else(|| default.to_string());
    value.parse().map_err(|_| ConfigError::InvalidValue {
        name: name.to_string(),
        value,
    })
}
