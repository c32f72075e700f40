//! Configuration loading from environment.

use std::env;

use anyhow::{Context, bail};

use rates_repo::cache::redis::{DEFAULT_CONNECTION_TIMEOUT_MS, DEFAULT_KEY_PREFIX};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// In-process cache is used when unset.
    pub redis_url: Option<String>,
    pub redis_key_prefix: String,
    pub redis_connect_timeout_ms: u64,
    pub log_format: LogFormat,
    /// OTLP export is enabled only when set.
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`, treating blank values as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port: u16 = match var("PORT") {
            Some(raw) => raw.parse().with_context(|| format!("invalid PORT: {raw}"))?,
            None => 8080,
        };
        if port == 0 {
            bail!("PORT must be between 1 and 65535");
        }

        let database_url =
            var("DATABASE_URL").context("DATABASE_URL environment variable is required")?;

        let redis_connect_timeout_ms = match var("REDIS_CONNECT_TIMEOUT_MS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("invalid REDIS_CONNECT_TIMEOUT_MS: {raw}"))?,
            None => DEFAULT_CONNECTION_TIMEOUT_MS,
        };

        let log_format = match var("LOG_FORMAT").as_deref().map(str::to_lowercase).as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => bail!("invalid LOG_FORMAT: {other} (expected text or json)"),
        };

        Ok(Self {
            host,
            port,
            database_url,
            redis_url: var("REDIS_URL"),
            redis_key_prefix: var("REDIS_KEY_PREFIX").unwrap_or_else(|| DEFAULT_KEY_PREFIX.into()),
            redis_connect_timeout_ms,
            log_format,
            otlp_endpoint: var("OTEL_EXPORTER_OTLP_ENDPOINT"),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/rateflow")]).unwrap();

        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.redis_url, None);
        assert_eq!(config.redis_key_prefix, "rateflow");
        assert_eq!(config.redis_connect_timeout_ms, 5000);
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.otlp_endpoint, None);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("DATABASE_URL", "sqlite://rates.db"),
            ("HOST", "127.0.0.1"),
            ("PORT", "9000"),
            ("REDIS_URL", "redis://cache:6379"),
            ("REDIS_KEY_PREFIX", "rf"),
            ("LOG_FORMAT", "JSON"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
        assert_eq!(config.redis_url.as_deref(), Some("redis://cache:6379"));
        assert_eq!(config.redis_key_prefix, "rf");
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_database_url_required() {
        assert!(load(&[]).is_err());
        assert!(load(&[("DATABASE_URL", "   ")]).is_err());
    }

    #[test]
    fn test_rejects_bad_values() {
        let db = ("DATABASE_URL", "postgres://localhost/rateflow");
        assert!(load(&[db, ("PORT", "0")]).is_err());
        assert!(load(&[db, ("PORT", "http")]).is_err());
        assert!(load(&[db, ("LOG_FORMAT", "xml")]).is_err());
        assert!(load(&[db, ("REDIS_CONNECT_TIMEOUT_MS", "soon")]).is_err());
    }

    #[test]
    fn test_blank_redis_url_means_memory_cache() {
        let config = load(&[("DATABASE_URL", "postgres://x"), ("REDIS_URL", " ")]).unwrap();
        assert_eq!(config.redis_url, None);
    }
}
