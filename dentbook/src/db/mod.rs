//! Persistence layer.
//!
//! - [`handlers`]: the [`Store`] trait and its backends
//! - [`models`]: records passed to and returned from a store
//! - [`errors`]: store-level error type

pub mod errors;
pub mod handlers;
pub mod models;

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::config::DatabaseConfig;

pub use handlers::{InMemoryStore, PostgresStore, Store};

/// Build the store selected by configuration. External databases are migrated before use.
pub async fn create_store(config: &DatabaseConfig) -> anyhow::Result<Arc<dyn Store>> {
    match config {
        DatabaseConfig::Memory => {
            info!("Using in-memory store; data will not survive a restart");
            Ok(Arc::new(InMemoryStore::new()))
        }
        DatabaseConfig::External { url, pool } => {
            info!(
                max_connections = pool.max_connections,
                min_connections = pool.min_connections,
                "Connecting to external database"
            );
            let pg_pool = PgPoolOptions::new()
                .max_connections(pool.max_connections)
                .min_connections(pool.min_connections)
                .acquire_timeout(pool.acquire_timeout)
                .idle_timeout(pool.idle_timeout)
                .connect(url)
                .await?;

            let store = PostgresStore::new(pg_pool);
            store.migrate().await?;
            info!("Database migrations applied");
            Ok(Arc::new(store))
        }
    }
}
