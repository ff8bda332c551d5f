use std::env;
use std::time::Duration;

use log::warn;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_DATABASE_TIMEOUT_SECS: u64 = 5;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: Option<String>,
    pub database_name: Option<String>,
    pub port: u16,
    /// Single allowed origin; any origin is accepted when unset.
    pub cors_allowed_origin: Option<String>,
    pub database_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match read("PORT") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("Invalid PORT value {:?}, falling back to {}", raw, DEFAULT_PORT);
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        let timeout_secs = read("DATABASE_TIMEOUT_SECS")
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(DEFAULT_DATABASE_TIMEOUT_SECS);

        Self {
            database_url: read("DATABASE_URL"),
            database_name: read("DATABASE_NAME"),
            port,
            cors_allowed_origin: read("CORS_ALLOWED_ORIGIN"),
            database_timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn bind_address(&self) -> (&'static str, u16) {
        ("0.0.0.0", self.port)
    }
}
