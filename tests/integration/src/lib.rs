//! Integration test utilities for the score engine
//!
//! Helpers for building service contexts over either store, seeding
//! streamers, and re-deriving totals from the ledger.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
