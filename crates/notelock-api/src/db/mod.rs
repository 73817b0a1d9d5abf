//! # Database Persistence
//!
//! Optional PostgreSQL persistence for the order store. When
//! `DATABASE_URL` is set, orders are durably persisted and the
//! conditional-UPDATE compare-and-set in [`orders`] is the authoritative
//! idempotency primitive (it survives restarts and is safe across
//! multiple server instances). When the variable is absent the service
//! runs in in-memory-only mode.

pub mod orders;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Initialize the connection pool from `DATABASE_URL`, if set.
///
/// Bootstraps the schema on first connect. Returns `Ok(None)` when no
/// database is configured.
pub async fn init_pool() -> Result<Option<PgPool>, sqlx::Error> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::warn!(
                "DATABASE_URL not set — running in-memory only. \
                 Orders will not survive a restart."
            );
            return Ok(None);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await?;
    ensure_schema(&pool).await?;
    tracing::info!("database connected");
    Ok(Some(pool))
}

/// Create the orders table if it does not exist.
async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS orders (
             order_id          TEXT PRIMARY KEY,
             payment_id        TEXT NOT NULL,
             amount            DOUBLE PRECISION NOT NULL,
             encrypted_payload BYTEA NOT NULL,
             state             TEXT NOT NULL,
             tx_reference      TEXT,
             failure_reason    TEXT,
             transition_log    JSONB NOT NULL,
             created_at        TIMESTAMPTZ NOT NULL,
             updated_at        TIMESTAMPTZ NOT NULL
         )",
    )
    .execute(pool)
    .await?;
    Ok(())
}
