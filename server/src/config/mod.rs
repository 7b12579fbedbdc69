use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::PgConnectOptions;
use thiserror::Error;
use tracing::info;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DB_HOST: &str = "localhost";
const DEFAULT_DB_PORT: u16 = 5432;
const DEFAULT_DB_USER: &str = "postgres";
const DEFAULT_DB_NAME: &str = "vsf";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("invalid DATABASE_URL")]
    DatabaseUrl(#[source] sqlx::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("expected 'postgres' or 'memory', got '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Takes precedence over the individual `DB_*` parts when set.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        match &self.url {
            Some(url) => url.parse().map_err(ConfigError::DatabaseUrl),
            None => Ok(PgConnectOptions::new()
                .host(&self.host)
                .port(self.port)
                .username(&self.user)
                .password(&self.password)
                .database(&self.name)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub backend: StorageBackend,
    pub database: DatabaseConfig,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key/value source. Unset keys fall back to
    /// defaults; set but unparsable keys are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            backend: parse_or(&lookup, "STORAGE_BACKEND", StorageBackend::Postgres)?,
            database: DatabaseConfig {
                url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
                host: lookup("DB_HOST").unwrap_or_else(|| DEFAULT_DB_HOST.to_string()),
                port: parse_or(&lookup, "DB_PORT", DEFAULT_DB_PORT)?,
                user: lookup("DB_USER").unwrap_or_else(|| DEFAULT_DB_USER.to_string()),
                password: lookup("DB_PASSWORD").unwrap_or_default(),
                name: lookup("DB_NAME").unwrap_or_else(|| DEFAULT_DB_NAME.to_string()),
                max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
                acquire_timeout: Duration::from_secs(parse_or(
                    &lookup,
                    "DB_ACQUIRE_TIMEOUT_SECS",
                    DEFAULT_ACQUIRE_TIMEOUT_SECS,
                )?),
            },
            request_timeout: Duration::from_secs(parse_or(
                &lookup,
                "REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?),
        };

        info!(
            backend = ?config.backend,
            port = config.port,
            request_timeout_secs = config.request_timeout.as_secs(),
            "Configuration loaded"
        );
        Ok(config)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.backend, StorageBackend::Postgres);
        assert_eq!(config.database.host, "localhost");
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.database.max_connections, 5);
        assert!(config.database.url.is_none());
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.host, "0.0.0.0");
    }

    #[test]
    fn test_database_parts() {
        let config = config_from(&[
            ("DB_HOST", "db.internal"),
            ("DB_PORT", "6543"),
            ("DB_USER", "vsf"),
            ("DB_PASSWORD", "p@ss:word"),
            ("DB_NAME", "volunteers"),
            ("PORT", "8080"),
            ("STORAGE_BACKEND", "Memory"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.backend, StorageBackend::Memory);

        let options = config.database.connect_options().unwrap();
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_username(), "vsf");
        assert_eq!(options.get_database(), Some("volunteers"));
    }

    #[test]
    fn test_database_url_wins() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://app@pg.example:5433/events"),
            ("DB_HOST", "ignored"),
        ])
        .unwrap();

        let options = config.database.connect_options().unwrap();
        assert_eq!(options.get_host(), "pg.example");
        assert_eq!(options.get_port(), 5433);
        assert_eq!(options.get_database(), Some("events"));
    }

    #[test]
    fn test_invalid_numbers_are_errors() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));

        let err = config_from(&[("STORAGE_BACKEND", "redis")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "STORAGE_BACKEND",
                ..
            }
        ));
    }
}
