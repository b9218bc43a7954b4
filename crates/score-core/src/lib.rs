//! # score-core
//!
//! Domain layer for per-user live score aggregation: identifiers, entities,
//! the append-only ledger events, the aggregate score row, and the storage
//! ports implemented by `score-db`.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    CommentEvent, Livestream, NewComment, NewLivestream, NewReaction, NewUser, ReactionEvent,
    LivestreamScore, ScoreDelta, User, UserScore,
};
pub use error::DomainError;
pub use traits::{
    AggregateStore, EventLedger, LivestreamAggregateStore, LivestreamRepository, OwnershipResolver, RepoResult,
    UnitOfWork, UserRepository,
};
pub use value_objects::{EventId, IdParseError, LivestreamId, UserId};
