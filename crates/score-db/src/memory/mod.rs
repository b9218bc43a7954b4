//! In-memory implementation of the score ports
//!
//! Behaves like the PostgreSQL store where the engine can observe it:
//! transactional staging, one writer per score row at a time, ids that
//! are never reused. Also offers fault injection so the engine's rollback
//! and retry paths can be driven deterministically.

mod faults;
mod store;
mod tx;

pub use faults::{FaultInjector, FaultPoint};
pub use store::MemoryStore;
pub use tx::MemoryTx;
