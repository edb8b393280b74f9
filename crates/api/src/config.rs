//! Application configuration loaded from environment variables.

use std::time::Duration;

/// Output format of the fmt tracing layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `text` or `json` (default: `text`)
/// - `DATABASE_URL`: primary PostgreSQL; unset runs on the in-memory store
/// - `REPLICA_DATABASE_URL`: PostgreSQL read by the query side (default: `DATABASE_URL`)
/// - `REPLICATION_INTERVAL_MS`: in-memory replicator period (default: `500`)
/// - `DATABASE_MAX_CONNECTIONS`: pool size per database (default: `5`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub database_url: Option<String>,
    pub replica_database_url: Option<String>,
    pub replication_interval: Duration,
    pub database_max_connections: u32,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let database_url = var("DATABASE_URL").filter(|url| !url.is_empty());
        let replica_database_url = var("REPLICA_DATABASE_URL")
            .filter(|url| !url.is_empty())
            .or_else(|| database_url.clone());

        Self {
            host: var("HOST").unwrap_or(defaults.host),
            port: var("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: var("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: var("LOG_FORMAT")
                .map(|f| LogFormat::parse(&f))
                .unwrap_or(defaults.log_format),
            database_url,
            replica_database_url,
            replication_interval: var("REPLICATION_INTERVAL_MS")
                .and_then(|ms| ms.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.replication_interval),
            database_max_connections: var("DATABASE_MAX_CONNECTIONS")
                .and_then(|n| n.parse().ok())
                .unwrap_or(defaults.database_max_connections),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            database_url: None,
            replica_database_url: None,
            replication_interval: Duration::from_millis(500),
            database_max_connections: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(config.database_url.is_none());
        assert_eq!(config.replication_interval, Duration::from_millis(500));
        assert_eq!(config.database_max_connections, 5);
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_empty_environment_uses_defaults() {
        let config = lookup(&[]);
        assert_eq!(config.addr(), "0.0.0.0:3000");
        assert!(config.replica_database_url.is_none());
    }

    #[test]
    fn test_replica_url_defaults_to_primary() {
        let config = lookup(&[("DATABASE_URL", "postgres://primary/catalog")]);
        assert_eq!(
            config.replica_database_url.as_deref(),
            Some("postgres://primary/catalog")
        );

        let config = lookup(&[
            ("DATABASE_URL", "postgres://primary/catalog"),
            ("REPLICA_DATABASE_URL", "postgres://replica/catalog"),
        ]);
        assert_eq!(
            config.replica_database_url.as_deref(),
            Some("postgres://replica/catalog")
        );
    }

    #[test]
    fn test_parsed_values() {
        let config = lookup(&[
            ("PORT", "8081"),
            ("LOG_FORMAT", "JSON"),
            ("REPLICATION_INTERVAL_MS", "50"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
        ]);
        assert_eq!(config.port, 8081);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.replication_interval, Duration::from_millis(50));
        assert_eq!(config.database_max_connections, 12);
    }

    #[test]
    fn test_unparsable_values_fall_back() {
        let config = lookup(&[("PORT", "http"), ("REPLICATION_INTERVAL_MS", "soon")]);
        assert_eq!(config.port, 3000);
        assert_eq!(config.replication_interval, Duration::from_millis(500));
    }
}
