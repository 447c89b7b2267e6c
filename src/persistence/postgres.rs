//! PostgreSQL implementation of the reachability probe.

use std::time::Duration;

use futures_util::future::BoxFuture;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::DataStore;
use crate::config::GatewayConfig;
use crate::error::GatewayError;

/// PostgreSQL-backed store handle using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Builds the connection pool from configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] when the pool cannot be established.
    pub async fn connect(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await
            .map_err(|e| GatewayError::internal(format!("failed to connect to database: {e}")))?;

        Ok(Self { pool })
    }

    /// Wraps an existing pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DataStore for PostgresStore {
    fn ping(&self) -> BoxFuture<'_, Result<bool, GatewayError>> {
        Box::pin(async move {
            match sqlx::query_scalar::<_, i32>("SELECT 1")
                .fetch_one(&self.pool)
                .await
            {
                Ok(_) => Ok(true),
                // Connection-class failures mean the store is unreachable,
                // which the health endpoint reports rather than erroring.
                Err(
                    sqlx::Error::Io(_)
                    | sqlx::Error::PoolTimedOut
                    | sqlx::Error::PoolClosed
                    | sqlx::Error::Tls(_),
                ) => Ok(false),
                Err(e) => Err(GatewayError::internal(format!("health probe failed: {e}"))),
            }
        })
    }
}
