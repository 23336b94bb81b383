use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, DatabaseConnection};
use thiserror::Error;
use tracing::info;

const IN_MEMORY_DB: &str = "sqlite::memory:";

/// Where the inventory graph is persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Sqlite { endpoint: String },
    Postgres { endpoint: String },
}

impl StoreBackend {
    /// Picks the backend from a connection URL; an empty URL means in-memory.
    pub fn from_url(url: &str) -> Result<Self, StoreError> {
        if url.is_empty() || url == IN_MEMORY_DB {
            Ok(StoreBackend::Memory)
        } else if url.starts_with("sqlite:") {
            Ok(StoreBackend::Sqlite {
                endpoint: url.to_owned(),
            })
        } else if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(StoreBackend::Postgres {
                endpoint: url.to_owned(),
            })
        } else {
            Err(StoreError::UnsupportedUrl(url.to_owned()))
        }
    }
}

#[derive(Clone)]
pub struct Database {
    pub conn: DatabaseConnection,
    pub endpoint: String,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Storage backend for '{0}' currently not supported")]
    UnsupportedUrl(String),
}

impl Database {
    pub async fn with(backend: StoreBackend) -> Result<Self, StoreError> {
        // SQLite only sees a consistent schema (and in-memory data at all)
        // through a single connection.
        let (endpoint, max_connections) = match backend {
            StoreBackend::Memory => (IN_MEMORY_DB.to_owned(), 1),
            StoreBackend::Sqlite { endpoint } => (endpoint, 1),
            StoreBackend::Postgres { endpoint } => (endpoint, 4),
        };

        let conn = sea_orm::Database::connect(
            ConnectOptions::new(endpoint.clone())
                .min_connections(1)
                .max_connections(max_connections)
                .sqlx_logging(false)
                .to_owned(),
        )
        .await?;

        Ok(Self { conn, endpoint })
    }

    #[cfg(test)]
    pub async fn for_test() -> Self {
        let this = Self::with(StoreBackend::Memory).await.unwrap();
        Migrator::up(&this.conn, None).await.unwrap();
        this
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        Migrator::up(&self.conn, None).await?;
        Ok(())
    }

    /// Drops every table and recreates the schema from scratch.
    pub async fn reset(&self) -> Result<(), StoreError> {
        info!(endpoint = %self.endpoint, "Resetting store");
        Migrator::fresh(&self.conn).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_url() {
        assert_eq!(StoreBackend::from_url("").unwrap(), StoreBackend::Memory);
        assert_eq!(
            StoreBackend::from_url("sqlite::memory:").unwrap(),
            StoreBackend::Memory
        );
        assert_eq!(
            StoreBackend::from_url("sqlite://inventory.db?mode=rwc").unwrap(),
            StoreBackend::Sqlite {
                endpoint: "sqlite://inventory.db?mode=rwc".to_owned()
            }
        );
        assert!(matches!(
            StoreBackend::from_url("postgres://localhost/inventory").unwrap(),
            StoreBackend::Postgres { .. }
        ));
        assert!(StoreBackend::from_url("mysql://localhost/inventory").is_err());
    }
}
