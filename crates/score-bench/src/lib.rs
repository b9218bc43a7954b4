//! # score-bench
//!
//! Replays the benchmark write pattern: many concurrent writers posting
//! reactions and tipped comments to a handful of streamers, followed by a
//! full re-derivation of every streamer's totals from the ledger.

pub mod config;
pub mod verify;
pub mod workload;

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use score_common::{AppConfig, StoreBackend};
use score_db::{create_pool, run_migrations, DatabaseConfig, MemoryStore, PgStore};
use score_service::{ScoreStore, ServiceContext};
use tracing::info;

pub use config::{BenchConfig, BenchConfigError};
pub use verify::{derive_from_ledger, derive_livestream_from_ledger, verify_totals, Mismatch};
pub use workload::{register_streamers, run_writers, Streamer, WriterTally};

/// Outcome of a bench run
#[derive(Debug, Clone, Copy)]
pub struct BenchReport {
    pub committed: u64,
    pub rejected: u64,
    pub elapsed: Duration,
}

impl BenchReport {
    /// Committed events per second
    pub fn throughput(&self) -> f64 {
        if self.elapsed.is_zero() {
            return 0.0;
        }
        self.committed as f64 / self.elapsed.as_secs_f64()
    }
}

/// Run the bench against the configured store
pub async fn run(config: &AppConfig, bench: &BenchConfig) -> anyhow::Result<BenchReport> {
    let lock_timeout = config.aggregation.lock_timeout();
    match config.store {
        StoreBackend::Memory => {
            let store = Arc::new(MemoryStore::with_lock_timeout(lock_timeout));
            run_with(ServiceContext::new(store, config.aggregation.clone()), bench).await
        }
        StoreBackend::Postgres => {
            let database = config
                .database
                .as_ref()
                .context("DATABASE_URL is required for the postgres store")?;
            info!("Connecting to PostgreSQL...");
            let pool = create_pool(&DatabaseConfig::from(database))
                .await
                .context("failed to connect to PostgreSQL")?;
            run_migrations(&pool).await.context("failed to create schema")?;
            info!("PostgreSQL connection established");

            let store = Arc::new(PgStore::new(pool).with_lock_timeout(lock_timeout));
            run_with(ServiceContext::new(store, config.aggregation.clone()), bench).await
        }
    }
}

/// Register streamers, drive the writers, and check every score row
pub async fn run_with<S: ScoreStore>(
    ctx: ServiceContext<S>,
    bench: &BenchConfig,
) -> anyhow::Result<BenchReport> {
    let streamers = register_streamers(&ctx, bench.users).await?;

    let started = Instant::now();
    let tally = run_writers(&ctx, &streamers, bench).await?;
    let elapsed = started.elapsed();

    let mismatches = verify_totals(&ctx, &streamers).await?;
    if let Some(first) = mismatches.first() {
        anyhow::bail!(
            "{} score rows disagree with the ledger, first: {first}",
            mismatches.len()
        );
    }

    Ok(BenchReport {
        committed: tally.committed,
        rejected: tally.rejected,
        elapsed,
    })
}
