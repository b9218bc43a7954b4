//! # score-db
//!
//! Storage layer implementing the score ports from `score-core`.
//!
//! ## Overview
//!
//! Two adapters implement every port (users, livestreams, ledger, score rows)
//! on a single type so the ledger append and the score update share one
//! transaction:
//!
//! - [`PgStore`]: PostgreSQL via SQLx. Row locks come from `UPDATE`, lock
//!   waits are bounded with `SET LOCAL lock_timeout`.
//! - [`MemoryStore`]: process-local maps with per-user async locks and
//!   fault injection for tests and benchmarks.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use score_db::{create_pool, run_migrations, DatabaseConfig, PgStore};
//! use score_core::traits::AggregateStore;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::from_env();
//!     let pool = create_pool(&config).await?;
//!     run_migrations(&pool).await?;
//!     let store = PgStore::new(pool);
//!
//!     // Use the store...
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::{FaultInjector, FaultPoint, MemoryStore, MemoryTx};
pub use pool::{create_pool, create_pool_from_env, run_migrations, DatabaseConfig, PgPool};
pub use repositories::{PgStore, PgTx};
