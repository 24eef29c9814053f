use std::{str::FromStr, time::Duration};

use serde::Deserialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::{create_schema, retry_with_backoff, DatabaseError};

const DEFAULT_POOL_SIZE: u32 = 20;
const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_RETRIES: usize = 3;
const CONNECT_RETRY_DELAY: Duration = Duration::from_millis(200);

/// Database section of the YAML config file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub database_url: Option<String>,
    pub pool_size: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    pub fn from_cli_or_env_or_yaml(
        cli_arg: Option<String>,
        yaml_config: Option<DatabaseSettings>,
    ) -> Self {
        let yaml_config = yaml_config.unwrap_or_default();
        let url = if let Some(arg) = cli_arg {
            arg
        } else if let Ok(env) = std::env::var("DATABASE_URL") {
            env
        } else if let Some(yaml) = yaml_config.database_url {
            yaml
        } else {
            "sqlite::memory:".to_string()
        };

        Self {
            url,
            pool_size: yaml_config.pool_size.unwrap_or(DEFAULT_POOL_SIZE),
            acquire_timeout: yaml_config
                .acquire_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_ACQUIRE_TIMEOUT),
        }
    }

    pub async fn create_pool(&self) -> Result<SqlitePool, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(&self.url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool_options = SqlitePoolOptions::new().acquire_timeout(self.acquire_timeout);
        // Every connection to an in-memory database opens a fresh, empty one.
        let pool_options = if self.url.contains(":memory:") {
            pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            pool_options.max_connections(self.pool_size)
        };

        pool_options.connect_with(options).await
    }

    /// Opens the pool, retrying transient failures, and makes sure the
    /// schema exists. An in-memory database starts empty on every run.
    pub async fn connect(&self) -> Result<SqlitePool, DatabaseError> {
        let pool = retry_with_backoff(
            || {
                let config = self.clone();
                Box::pin(async move { config.create_pool().await })
            },
            CONNECT_RETRIES,
            CONNECT_RETRY_DELAY,
        )
        .await
        .map_err(|e| DatabaseError::Connection(e.to_string()))?;

        create_schema(&pool).await?;
        Ok(pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_argument_wins() {
        let config = DatabaseConfig::from_cli_or_env_or_yaml(
            Some("sqlite://cli.db".to_string()),
            Some(DatabaseSettings {
                database_url: Some("sqlite://yaml.db".to_string()),
                pool_size: Some(4),
                acquire_timeout_secs: Some(5),
            }),
        );

        assert_eq!(config.url, "sqlite://cli.db");
        assert_eq!(config.pool_size, 4);
        assert_eq!(config.acquire_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_defaults_without_yaml() {
        let config = DatabaseConfig::from_cli_or_env_or_yaml(Some("sqlite::memory:".into()), None);

        assert_eq!(config.pool_size, DEFAULT_POOL_SIZE);
        assert_eq!(config.acquire_timeout, DEFAULT_ACQUIRE_TIMEOUT);
    }

    #[tokio::test]
    async fn test_create_in_memory_pool() {
        let config = DatabaseConfig::from_cli_or_env_or_yaml(Some("sqlite::memory:".into()), None);
        let pool = config.create_pool().await.expect("Failed to create pool");

        let one: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&pool)
            .await
            .expect("Failed to query");
        assert_eq!(one, 1);
    }
}
