/**
 * Server Configuration
 *
 * Storage selection at startup. With a `database_url` configured the server
 * connects to PostgreSQL and runs migrations; without one, or when the
 * connection fails, it falls back to the in-memory store.
 *
 * # Error Handling
 *
 * Database errors are logged but do not prevent server startup.
 */

#[cfg(feature = "ssr")]
use sqlx::PgPool;
#[cfg(feature = "ssr")]
use std::sync::Arc;

#[cfg(feature = "ssr")]
use crate::backend::scheduler::{MemoryStore, PgStore, Store};
#[cfg(feature = "ssr")]
use crate::shared::AppConfig;

/// Connect to PostgreSQL and run migrations
///
/// # Returns
///
/// - `Some(PgPool)` if the database is reachable
/// - `None` if `database_url` is not set or the connection fails
#[cfg(feature = "ssr")]
pub async fn load_database(database_url: Option<&str>) -> Option<PgPool> {
    let Some(database_url) = database_url else {
        tracing::warn!("DATABASE_URL not set. Using the in-memory club store.");
        return None;
    };

    tracing::info!("Connecting to database...");

    let pool = match PgPool::connect(database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "Failed to create database connection pool");
            tracing::warn!("Falling back to the in-memory club store.");
            return None;
        }
    };

    tracing::info!("Running database migrations...");
    match sqlx::migrate!().run(&pool).await {
        Ok(()) => tracing::info!("Database migrations completed successfully"),
        Err(e) => {
            // Continue anyway - migrations might have already been run
            tracing::error!(error = %e, "Failed to run database migrations");
        }
    }

    Some(pool)
}

/// Pick the club store for `config`
#[cfg(feature = "ssr")]
pub async fn load_store(config: &AppConfig) -> Store {
    match load_database(config.database_url.as_deref()).await {
        Some(pool) => Store::Postgres(PgStore::new(pool)),
        None => Store::Memory(Arc::new(MemoryStore::new())),
    }
}
