//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation. Write operations that must commit together
//! take a transaction handle from [`UnitOfWork`]; reads run against
//! committed state only.

use async_trait::async_trait;

use crate::entities::{
    CommentEvent, Livestream, LivestreamScore, NewComment, NewLivestream, NewReaction, NewUser,
    ReactionEvent, ScoreDelta, User, UserScore,
};
use crate::error::DomainError;
use crate::value_objects::{LivestreamId, UserId};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Unit of Work
// ============================================================================

/// Transaction boundary shared by every port that writes
///
/// Everything staged through one `Tx` becomes visible at `commit` or not at
/// all. Dropping a `Tx` without committing must have the same effect as
/// `rollback`.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    type Tx: Send;

    /// Open a new transaction
    async fn begin(&self) -> RepoResult<Self::Tx>;

    /// Make everything staged in `tx` visible atomically
    async fn commit(&self, tx: Self::Tx) -> RepoResult<()>;

    /// Discard everything staged in `tx`
    async fn rollback(&self, tx: Self::Tx) -> RepoResult<()>;
}

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: UnitOfWork {
    /// Insert a user; fails with `UserAlreadyExists` on a duplicate name
    async fn create(&self, tx: &mut Self::Tx, user: NewUser) -> RepoResult<User>;

    /// Find user by ID
    async fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>>;

    /// Find user by unique name
    async fn find_by_name(&self, name: &str) -> RepoResult<Option<User>>;
}

// ============================================================================
// Livestream Repository / Ownership Resolver
// ============================================================================

/// Maps a livestream to the user whose score its events feed
#[async_trait]
pub trait OwnershipResolver: Send + Sync {
    /// Owner of a committed livestream; `LivestreamNotFound` otherwise
    async fn resolve_owner(&self, livestream_id: LivestreamId) -> RepoResult<UserId>;
}

#[async_trait]
pub trait LivestreamRepository: OwnershipResolver {
    /// Insert a livestream together with its zero score row; the owner
    /// must exist
    async fn create(&self, livestream: NewLivestream) -> RepoResult<Livestream>;

    /// Find livestream by ID
    async fn find_by_id(&self, id: LivestreamId) -> RepoResult<Option<Livestream>>;

    /// List livestreams owned by a user (ordered by id)
    async fn find_by_owner(&self, owner_id: UserId) -> RepoResult<Vec<Livestream>>;
}

// ============================================================================
// Event Ledger
// ============================================================================

/// Append-only log of reactions and comments; the source of truth the
/// score rows are derived from
#[async_trait]
pub trait EventLedger: UnitOfWork {
    /// Stage a reaction and assign its sequence number
    async fn append_reaction(&self, tx: &mut Self::Tx, reaction: NewReaction)
        -> RepoResult<ReactionEvent>;

    /// Stage a comment and assign its sequence number
    async fn append_comment(&self, tx: &mut Self::Tx, comment: NewComment)
        -> RepoResult<CommentEvent>;

    /// Committed reactions for a livestream, ascending id
    async fn reactions_by_livestream(&self, livestream_id: LivestreamId)
        -> RepoResult<Vec<ReactionEvent>>;

    /// Committed comments for a livestream, ascending id
    async fn comments_by_livestream(&self, livestream_id: LivestreamId)
        -> RepoResult<Vec<CommentEvent>>;
}

// ============================================================================
// Aggregate Store
// ============================================================================

/// One score row per user, adjusted in place by deltas
#[async_trait]
pub trait AggregateStore: UnitOfWork {
    /// Create a zero row for `user_id` if none exists. Never resets an
    /// existing row; returns the row as seen by `tx`.
    async fn ensure_row(&self, tx: &mut Self::Tx, user_id: UserId) -> RepoResult<UserScore>;

    /// Add `delta` to the row and return the post-update values.
    ///
    /// Holds the row's write lock until `tx` ends, so concurrent deltas to
    /// the same user serialize and deltas to other users do not wait.
    /// A missing row is `ScoreRowMissing`; a lock wait beyond the configured
    /// timeout is `TransientContention`.
    async fn apply_delta(
        &self,
        tx: &mut Self::Tx,
        user_id: UserId,
        delta: ScoreDelta,
    ) -> RepoResult<UserScore>;

    /// Committed row for a user
    async fn read(&self, user_id: UserId) -> RepoResult<UserScore>;

    /// 1-based rank by score (reactions + tip) descending, ties broken by
    /// user name descending
    async fn rank_of(&self, user_id: UserId) -> RepoResult<i64>;

    /// Sum of `total_tip` over every row
    async fn total_tip(&self) -> RepoResult<i64>;
}

/// One score row per livestream, maintained alongside the owner's row
#[async_trait]
pub trait LivestreamAggregateStore: UnitOfWork {
    /// Add the delta of one event and return the post-update values.
    ///
    /// Same locking contract as [`AggregateStore::apply_delta`]. Callers
    /// that also update the owner's row lock that one first.
    async fn apply_livestream_delta(
        &self,
        tx: &mut Self::Tx,
        livestream_id: LivestreamId,
        delta: ScoreDelta,
    ) -> RepoResult<LivestreamScore>;

    /// Committed row for a livestream
    async fn read_livestream(&self, livestream_id: LivestreamId) -> RepoResult<LivestreamScore>;

    /// 1-based rank by score (reactions + tip) descending, ties broken by
    /// livestream id descending
    async fn livestream_rank_of(&self, livestream_id: LivestreamId) -> RepoResult<i64>;
}
