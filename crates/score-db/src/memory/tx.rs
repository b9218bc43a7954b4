//! Staged writes of one in-memory transaction

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::{Mutex, OwnedMutexGuard};

use score_core::entities::{CommentEvent, LivestreamScore, ReactionEvent, User, UserScore};
use score_core::value_objects::{LivestreamId, UserId};

/// A score row: the committed totals plus the lock writers queue on
#[derive(Debug)]
pub(crate) struct RowSlot<R> {
    pub(crate) writer: Arc<Mutex<()>>,
    pub(crate) committed: RwLock<R>,
}

impl<R> RowSlot<R> {
    pub(crate) fn new(zero: R) -> Self {
        Self {
            writer: Arc::new(Mutex::new(())),
            committed: RwLock::new(zero),
        }
    }
}

pub(crate) type ScoreSlot = RowSlot<UserScore>;
pub(crate) type LivestreamSlot = RowSlot<LivestreamScore>;

/// A delta held against one row until the transaction ends
#[derive(Debug)]
pub(crate) struct PendingDelta<R> {
    pub(crate) slot: Arc<RowSlot<R>>,
    /// Row as it will read after commit
    pub(crate) post: R,
    pub(crate) _guard: OwnedMutexGuard<()>,
}

/// Transaction handle for [`MemoryStore`](super::MemoryStore)
///
/// Nothing staged here is visible to other callers until commit. Dropping
/// it releases every row lock it holds and discards the staged writes.
#[derive(Debug, Default)]
pub struct MemoryTx {
    pub(crate) users: Vec<User>,
    pub(crate) rows: Vec<UserId>,
    pub(crate) reactions: Vec<ReactionEvent>,
    pub(crate) comments: Vec<CommentEvent>,
    pub(crate) deltas: HashMap<UserId, PendingDelta<UserScore>>,
    pub(crate) livestream_deltas: HashMap<LivestreamId, PendingDelta<LivestreamScore>>,
}

impl MemoryTx {
    /// Number of score rows this transaction currently holds locked
    pub fn locked_rows(&self) -> usize {
        self.deltas.len() + self.livestream_deltas.len()
    }

    pub(crate) fn stages_user(&self, user_id: UserId) -> bool {
        self.users.iter().any(|user| user.id == user_id)
    }

    pub(crate) fn stages_name(&self, name: &str) -> bool {
        self.users.iter().any(|user| user.name == name)
    }
}
