//! PostgreSQL store and its unit of work

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;

use score_core::traits::{RepoResult, UnitOfWork};

use super::error::map_db_error;

/// Transaction handle used by every `PgStore` port
pub type PgTx = Transaction<'static, Postgres>;

/// PostgreSQL implementation of the score ports
#[derive(Clone)]
pub struct PgStore {
    pub(super) pool: PgPool,
    lock_timeout: Duration,
}

impl PgStore {
    /// Create a new PgStore with a 5 second row lock timeout
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            lock_timeout: Duration::from_secs(5),
        }
    }

    /// Override how long a transaction may wait on a row lock
    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }

    /// Get the underlying connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UnitOfWork for PgStore {
    type Tx = PgTx;

    #[instrument(skip(self))]
    async fn begin(&self) -> RepoResult<PgTx> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // SET LOCAL does not accept bind parameters
        let statement = format!(
            "SET LOCAL lock_timeout = '{}ms'",
            self.lock_timeout.as_millis()
        );
        sqlx::query(&statement)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        Ok(tx)
    }

    #[instrument(skip_all)]
    async fn commit(&self, tx: PgTx) -> RepoResult<()> {
        tx.commit().await.map_err(map_db_error)
    }

    #[instrument(skip_all)]
    async fn rollback(&self, tx: PgTx) -> RepoResult<()> {
        tx.rollback().await.map_err(map_db_error)
    }
}

impl std::fmt::Debug for PgStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgStore")
            .field("pool", &"PgPool")
            .field("lock_timeout", &self.lock_timeout)
            .finish()
    }
}
