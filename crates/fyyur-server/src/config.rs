use std::env;
use std::net::SocketAddr;

use thiserror::Error;

const DEFAULT_BIND: &str = "0.0.0.0:5000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid FYYUR_BIND address {0:?}: {1}")]
    InvalidBind(String, std::net::AddrParseError),

    #[error("invalid PORT {0:?}")]
    InvalidPort(String),
}

/// HTTP-side settings. Database settings live in [`fyyur_db::DatabaseConfig`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub production: bool,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = lookup("FYYUR_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let mut bind: SocketAddr = raw
            .parse()
            .map_err(|e| ConfigError::InvalidBind(raw.clone(), e))?;

        if let Some(port) = lookup("PORT") {
            let port = port
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
            bind.set_port(port);
        }

        let production = lookup("FYYUR_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        Ok(Self { bind, production })
    }
}
