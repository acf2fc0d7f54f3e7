use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::{Backend, DatabaseConfig};
use crate::database::{MemoryStore, PgStore, Store};

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Movie is out of stock")]
    OutOfStock,

    #[error("Return already processed")]
    AlreadyProcessed,

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Builds the configured storage backend
pub struct DatabaseManager;

impl DatabaseManager {
    /// Connect to the backend named by `config.url`, running migrations
    /// first when enabled.
    pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn Store>, DatabaseError> {
        let backend = config
            .backend()
            .map_err(|_| DatabaseError::InvalidDatabaseUrl(config.redacted_url()))?;

        match backend {
            Backend::Memory => {
                info!("Using in-memory store");
                Ok(Arc::new(MemoryStore::new()))
            }
            Backend::Postgres => {
                let pool = Self::pool(config).await?;
                if config.run_migrations {
                    Self::migrate(&pool).await?;
                }
                info!("Connected to {}", config.redacted_url());
                Ok(Arc::new(PgStore::new(pool)))
            }
        }
    }

    /// Create the Postgres pool with the configured limits
    pub async fn pool(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        if config.url.trim().is_empty() {
            return Err(DatabaseError::ConfigMissing("DATABASE_URL"));
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&config.url)
            .await?;
        Ok(pool)
    }

    /// Apply everything under `migrations/`
    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, Environment};

    #[tokio::test]
    async fn memory_url_selects_memory_store() {
        let config = AppConfig::preset(Environment::Development);
        let store = DatabaseManager::connect(&config.database).await.unwrap();
        assert!(store.health_check().await.is_ok());
        assert!(store.list_genres().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_scheme_is_rejected() {
        let mut config = AppConfig::preset(Environment::Development).database;
        config.url = "mongodb://localhost/vidly".to_string();
        let result = DatabaseManager::connect(&config).await;
        assert!(matches!(result, Err(DatabaseError::InvalidDatabaseUrl(_))));
    }
}
