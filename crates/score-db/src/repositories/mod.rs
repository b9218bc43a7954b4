//! Repository implementations
//!
//! PostgreSQL implementations of the storage ports defined in score-core.
//! A single `PgStore` implements every port so that the ledger append and the
//! score update can share one transaction.

mod error;
mod ledger;
mod livestream;
mod livestream_score;
mod score;
mod store;
mod user;

pub use store::{PgStore, PgTx};
