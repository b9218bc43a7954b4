//! Business logic services
//!
//! Each service borrows a [`ServiceContext`] and orchestrates the storage
//! ports; none of them hold state of their own.

pub mod aggregation;
pub mod context;
pub mod error;
pub mod livestream;
pub mod reader;
pub mod user;

// Re-export all services for convenience
pub use aggregation::AggregationEngine;
pub use context::{ScoreStore, ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use livestream::LivestreamService;
pub use reader::ScoreReader;
pub use user::UserService;
