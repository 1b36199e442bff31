use chrono::{DateTime, Utc};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::env;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

pub mod aggregation;
pub mod entities;
pub mod genres;
pub mod queries;

/// Re-export for convenience
pub use sea_orm;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl DatabaseConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source.
    ///
    /// `DATABASE_URL` wins; otherwise the URL is assembled from `DB_USER`,
    /// `DB_PASSWORD`, `DB_HOST`, `DB_PORT` and `DB_NAME`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("DATABASE_URL").unwrap_or_else(|| {
            let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
            format!(
                "postgres://{}:{}@{}:{}/{}",
                var("DB_USER", "postgres"),
                var("DB_PASSWORD", "123456"),
                var("DB_HOST", "localhost"),
                var("DB_PORT", "5432"),
                var("DB_NAME", "postgres"),
            )
        });

        Self {
            url,
            max_connections: parse_var(&lookup, "DB_MAX_CONNECTIONS").unwrap_or(10),
            min_connections: parse_var(&lookup, "DB_MIN_CONNECTIONS").unwrap_or(1),
            connect_timeout_secs: parse_var(&lookup, "DB_CONNECT_TIMEOUT").unwrap_or(8),
            idle_timeout_secs: parse_var(&lookup, "DB_IDLE_TIMEOUT").unwrap_or(300),
        }
    }
}

/// Unset or unparsable values (including out-of-range numbers) read as `None`.
fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|v| v.trim().parse().ok())
}

/// Source of the reference time used to split shows into past and upcoming.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(Utc::now)
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub clock: Clock,
    /// Mark cookies `Secure` (production deployments behind TLS).
    pub secure_cookies: bool,
}

impl AppState {
    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }
}

/// Connect to the database and return a connection pool
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(&config.url);
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    Database::connect(opt).await
}
