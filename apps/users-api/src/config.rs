use core_config::{AppInfo, ConfigError, FromEnv, app_info, env_parse, server::ServerConfig};
use database::postgres::PostgresConfig;
use std::str::FromStr;
use std::time::Duration;

pub use core_config::Environment;

/// Backing store for users
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserStore {
    Postgres,
    /// Process-local; contents are lost on restart
    Memory,
}

impl FromStr for UserStore {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" => Ok(UserStore::Postgres),
            "memory" => Ok(UserStore::Memory),
            other => Err(format!("unknown store '{other}', expected 'postgres' or 'memory'")),
        }
    }
}

/// Application-specific configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub store: UserStore,
    /// Present only when `store` is [`UserStore::Postgres`]
    pub database: Option<PostgresConfig>,
    pub max_page_size: u64,
    pub store_timeout: Duration,
    pub health_check_timeout: Duration,
}

impl Config {
    /// - `USERS_STORE`: `postgres` (default) or `memory`
    /// - `USERS_MAX_PAGE_SIZE`: defaults to 100
    /// - `STORE_TIMEOUT_MS`: defaults to 5000
    /// - `HEALTH_CHECK_TIMEOUT_SECS`: defaults to 5
    ///
    /// `DATABASE_URL` is required for the Postgres store.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?;
        let store: UserStore = env_parse("USERS_STORE", "postgres")?;
        let database = match store {
            UserStore::Postgres => Some(PostgresConfig::from_env()?),
            UserStore::Memory => None,
        };

        let max_page_size: u64 = env_parse("USERS_MAX_PAGE_SIZE", "100")?;
        if max_page_size == 0 {
            return Err(ConfigError::ParseError {
                key: "USERS_MAX_PAGE_SIZE".to_string(),
                details: "must be at least 1".to_string(),
            });
        }

        let store_timeout_ms: u64 = env_parse("STORE_TIMEOUT_MS", "5000")?;
        let health_check_timeout_secs: u64 = env_parse("HEALTH_CHECK_TIMEOUT_SECS", "5")?;

        Ok(Self {
            app: app_info!(),
            environment,
            server,
            store,
            database,
            max_page_size,
            store_timeout: Duration::from_millis(store_timeout_ms),
            health_check_timeout: Duration::from_secs(health_check_timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 7] = [
        "USERS_STORE",
        "DATABASE_URL",
        "USERS_MAX_PAGE_SIZE",
        "STORE_TIMEOUT_MS",
        "HEALTH_CHECK_TIMEOUT_SECS",
        "PORT",
        "SHUTDOWN_TIMEOUT_SECS",
    ];

    fn with_env<F: FnOnce()>(vars: &[(&str, &str)], f: F) {
        let mut all: Vec<(&str, Option<&str>)> = VARS.iter().map(|key| (*key, None)).collect();
        for &(key, value) in vars {
            all.retain(|(k, _)| *k != key);
            all.push((key, Some(value)));
        }
        temp_env::with_vars(all, f);
    }

    #[test]
    fn test_defaults_with_postgres() {
        with_env(&[("DATABASE_URL", "postgresql://localhost/users")], || {
            let config = Config::from_env().unwrap();

            assert_eq!(config.store, UserStore::Postgres);
            assert_eq!(
                config.database.as_ref().map(PostgresConfig::url),
                Some("postgresql://localhost/users")
            );
            assert_eq!(config.max_page_size, 100);
            assert_eq!(config.store_timeout, Duration::from_secs(5));
            assert_eq!(config.health_check_timeout, Duration::from_secs(5));
            assert_eq!(config.server.port, 8080);
            assert_eq!(config.server.shutdown_timeout, Duration::from_secs(30));
        });
    }

    #[test]
    fn test_postgres_store_requires_database_url() {
        with_env(&[], || {
            let err = Config::from_env().unwrap_err();
            assert!(matches!(err, ConfigError::MissingEnvVar(key) if key == "DATABASE_URL"));
        });
    }

    #[test]
    fn test_memory_store_needs_no_database() {
        with_env(&[("USERS_STORE", "Memory")], || {
            let config = Config::from_env().unwrap();
            assert_eq!(config.store, UserStore::Memory);
            assert!(config.database.is_none());
        });
    }

    #[test]
    fn test_overrides() {
        with_env(
            &[
                ("USERS_STORE", "memory"),
                ("USERS_MAX_PAGE_SIZE", "250"),
                ("STORE_TIMEOUT_MS", "750"),
                ("HEALTH_CHECK_TIMEOUT_SECS", "2"),
                ("SHUTDOWN_TIMEOUT_SECS", "10"),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.max_page_size, 250);
                assert_eq!(config.store_timeout, Duration::from_millis(750));
                assert_eq!(config.health_check_timeout, Duration::from_secs(2));
                assert_eq!(config.server.shutdown_timeout, Duration::from_secs(10));
            },
        );
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        with_env(&[("USERS_STORE", "redis")], || {
            let err = Config::from_env().unwrap_err();
            assert!(matches!(err, ConfigError::ParseError { key, .. } if key == "USERS_STORE"));
        });

        with_env(&[("USERS_STORE", "memory"), ("USERS_MAX_PAGE_SIZE", "0")], || {
            let err = Config::from_env().unwrap_err();
            assert!(
                matches!(err, ConfigError::ParseError { key, .. } if key == "USERS_MAX_PAGE_SIZE")
            );
        });

        with_env(&[("USERS_STORE", "memory"), ("STORE_TIMEOUT_MS", "soon")], || {
            assert!(Config::from_env().is_err());
        });
    }
}
