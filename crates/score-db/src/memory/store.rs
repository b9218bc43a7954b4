//! In-memory store implementing every score port

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, error, instrument};

use score_core::entities::{
    CommentEvent, Livestream, LivestreamScore, NewComment, NewLivestream, NewReaction, NewUser,
    ReactionEvent, ScoreDelta, User, UserScore,
};
use score_core::error::DomainError;
use score_core::traits::{
    AggregateStore, EventLedger, LivestreamAggregateStore, LivestreamRepository,
    OwnershipResolver, RepoResult, UnitOfWork, UserRepository,
};
use score_core::value_objects::{EventId, LivestreamId, UserId};

use super::faults::{FaultInjector, FaultPoint};
use super::tx::{LivestreamSlot, MemoryTx, PendingDelta, RowSlot, ScoreSlot};

const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Process-local store with per-row locks
///
/// Score rows live in sharded maps; each row carries its own writer lock,
/// so deltas to different users never wait on each other. Readers only
/// take the short-lived `RwLock` around the committed totals and never
/// wait for an open transaction.
///
/// A user or livestream is published only after its score row, so anyone
/// who can see one can also read its row.
pub struct MemoryStore {
    users: DashMap<UserId, User>,
    user_names: DashMap<String, UserId>,
    livestreams: DashMap<LivestreamId, Livestream>,
    scores: DashMap<UserId, Arc<ScoreSlot>>,
    livestream_scores: DashMap<LivestreamId, Arc<LivestreamSlot>>,
    reactions: RwLock<BTreeMap<EventId, ReactionEvent>>,
    comments: RwLock<BTreeMap<EventId, CommentEvent>>,
    next_user_id: AtomicI64,
    next_livestream_id: AtomicI64,
    next_reaction_id: AtomicI64,
    next_comment_id: AtomicI64,
    lock_timeout: Duration,
    faults: FaultInjector,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_lock_timeout(DEFAULT_LOCK_TIMEOUT)
    }

    /// Store whose row lock waits give up after `lock_timeout`
    pub fn with_lock_timeout(lock_timeout: Duration) -> Self {
        Self {
            users: DashMap::new(),
            user_names: DashMap::new(),
            livestreams: DashMap::new(),
            scores: DashMap::new(),
            livestream_scores: DashMap::new(),
            reactions: RwLock::new(BTreeMap::new()),
            comments: RwLock::new(BTreeMap::new()),
            next_user_id: AtomicI64::new(1),
            next_livestream_id: AtomicI64::new(1),
            next_reaction_id: AtomicI64::new(1),
            next_comment_id: AtomicI64::new(1),
            lock_timeout,
            faults: FaultInjector::default(),
        }
    }

    pub fn lock_timeout(&self) -> Duration {
        self.lock_timeout
    }

    /// Armed failures, for exercising rollback and retry paths
    pub fn faults(&self) -> &FaultInjector {
        &self.faults
    }

    /// Committed reactions across all livestreams
    pub fn reaction_count(&self) -> usize {
        self.reactions.read().len()
    }

    /// Committed comments across all livestreams
    pub fn comment_count(&self) -> usize {
        self.comments.read().len()
    }

    fn slot(&self, user_id: UserId) -> Option<Arc<ScoreSlot>> {
        self.scores.get(&user_id).map(|slot| Arc::clone(slot.value()))
    }

    fn livestream_slot(&self, livestream_id: LivestreamId) -> Option<Arc<LivestreamSlot>> {
        self.livestream_scores
            .get(&livestream_id)
            .map(|slot| Arc::clone(slot.value()))
    }

    fn user_exists(&self, user_id: UserId) -> bool {
        self.users.contains_key(&user_id)
    }

    /// Wait for a row's writer lock, at most `lock_timeout`
    async fn lock_row<R>(
        &self,
        slot: &Arc<RowSlot<R>>,
        describe: impl FnOnce() -> String,
    ) -> RepoResult<OwnedMutexGuard<()>> {
        tokio::time::timeout(self.lock_timeout, Arc::clone(&slot.writer).lock_owned())
            .await
            .map_err(|_| {
                DomainError::TransientContention(format!(
                    "{} lock wait exceeded {}ms",
                    describe(),
                    self.lock_timeout.as_millis()
                ))
            })
    }

    /// Insert zero rows for the staged users; returns the ones created here
    fn commit_rows(&self, rows: Vec<UserId>) -> Vec<UserId> {
        rows.into_iter()
            .filter(|user_id| match self.scores.entry(*user_id) {
                Entry::Vacant(slot) => {
                    slot.insert(Arc::new(ScoreSlot::new(UserScore::zero(*user_id))));
                    true
                }
                Entry::Occupied(_) => false,
            })
            .collect()
    }

    /// Publish the staged users, undoing partial name claims on conflict
    fn commit_users(&self, users: Vec<User>) -> RepoResult<()> {
        let mut claimed = Vec::with_capacity(users.len());
        for user in &users {
            match self.user_names.entry(user.name.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(user.id);
                    claimed.push(user.name.clone());
                }
                Entry::Occupied(_) => {
                    for name in claimed {
                        self.user_names.remove(&name);
                    }
                    return Err(DomainError::UserAlreadyExists(user.name.clone()));
                }
            }
        }
        for user in users {
            self.users.insert(user.id, user);
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("users", &self.users.len())
            .field("livestreams", &self.livestreams.len())
            .field("score_rows", &self.scores.len())
            .field("livestream_score_rows", &self.livestream_scores.len())
            .field("lock_timeout", &self.lock_timeout)
            .finish()
    }
}

// ============================================================================
// Unit of Work
// ============================================================================

#[async_trait]
impl UnitOfWork for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> RepoResult<MemoryTx> {
        Ok(MemoryTx::default())
    }

    #[instrument(skip_all, fields(locked_rows = tx.locked_rows()))]
    async fn commit(&self, tx: MemoryTx) -> RepoResult<()> {
        if self.faults.trip(FaultPoint::Commit) {
            return Err(DomainError::InjectedFault(FaultPoint::Commit.as_str()));
        }

        let MemoryTx {
            users,
            rows,
            reactions,
            comments,
            deltas,
            livestream_deltas,
        } = tx;

        // Rows go in before their users become visible
        let created = self.commit_rows(rows);
        if let Err(e) = self.commit_users(users) {
            for user_id in created {
                self.scores.remove(&user_id);
            }
            return Err(e);
        }

        // Ledger readers wait here until the matching deltas are in place
        let mut reaction_log = self.reactions.write();
        let mut comment_log = self.comments.write();
        reaction_log.extend(reactions.into_iter().map(|event| (event.id, event)));
        comment_log.extend(comments.into_iter().map(|event| (event.id, event)));

        for pending in deltas.into_values() {
            *pending.slot.committed.write() = pending.post;
        }
        for pending in livestream_deltas.into_values() {
            *pending.slot.committed.write() = pending.post;
        }

        debug!("Memory transaction committed");
        Ok(())
    }

    async fn rollback(&self, tx: MemoryTx) -> RepoResult<()> {
        drop(tx);
        Ok(())
    }
}

// ============================================================================
// Users
// ============================================================================

#[async_trait]
impl UserRepository for MemoryStore {
    #[instrument(skip(self, tx))]
    async fn create(&self, tx: &mut MemoryTx, user: NewUser) -> RepoResult<User> {
        if self.user_names.contains_key(&user.name) || tx.stages_name(&user.name) {
            return Err(DomainError::UserAlreadyExists(user.name));
        }

        let id = UserId::new(self.next_user_id.fetch_add(1, Ordering::Relaxed));
        let user = user.into_user(id);
        tx.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        Ok(self.users.get(&id).map(|user| user.value().clone()))
    }

    async fn find_by_name(&self, name: &str) -> RepoResult<Option<User>> {
        let Some(id) = self.user_names.get(name).map(|id| *id.value()) else {
            return Ok(None);
        };
        Ok(self.users.get(&id).map(|user| user.value().clone()))
    }
}

// ============================================================================
// Livestreams
// ============================================================================

#[async_trait]
impl OwnershipResolver for MemoryStore {
    async fn resolve_owner(&self, livestream_id: LivestreamId) -> RepoResult<UserId> {
        self.livestreams
            .get(&livestream_id)
            .map(|livestream| livestream.owner_id)
            .ok_or(DomainError::LivestreamNotFound(livestream_id))
    }
}

#[async_trait]
impl LivestreamRepository for MemoryStore {
    #[instrument(skip(self))]
    async fn create(&self, livestream: NewLivestream) -> RepoResult<Livestream> {
        if !self.user_exists(livestream.owner_id) {
            return Err(DomainError::UserNotFound(livestream.owner_id));
        }

        let id = LivestreamId::new(self.next_livestream_id.fetch_add(1, Ordering::Relaxed));
        let livestream = livestream.into_livestream(id);
        self.livestream_scores
            .insert(id, Arc::new(LivestreamSlot::new(LivestreamScore::zero(id))));
        self.livestreams.insert(id, livestream.clone());
        Ok(livestream)
    }

    async fn find_by_id(&self, id: LivestreamId) -> RepoResult<Option<Livestream>> {
        Ok(self.livestreams.get(&id).map(|ls| ls.value().clone()))
    }

    async fn find_by_owner(&self, owner_id: UserId) -> RepoResult<Vec<Livestream>> {
        let mut owned: Vec<Livestream> = self
            .livestreams
            .iter()
            .filter(|ls| ls.is_owned_by(owner_id))
            .map(|ls| ls.value().clone())
            .collect();
        owned.sort_by_key(|ls| ls.id);
        Ok(owned)
    }
}

// ============================================================================
// Event Ledger
// ============================================================================

#[async_trait]
impl EventLedger for MemoryStore {
    #[instrument(skip(self, tx))]
    async fn append_reaction(
        &self,
        tx: &mut MemoryTx,
        reaction: NewReaction,
    ) -> RepoResult<ReactionEvent> {
        if !self.livestreams.contains_key(&reaction.livestream_id) {
            return Err(DomainError::LivestreamNotFound(reaction.livestream_id));
        }

        let id = EventId::new(self.next_reaction_id.fetch_add(1, Ordering::Relaxed));
        let event = reaction.into_event(id);
        tx.reactions.push(event.clone());
        Ok(event)
    }

    #[instrument(skip(self, tx))]
    async fn append_comment(
        &self,
        tx: &mut MemoryTx,
        comment: NewComment,
    ) -> RepoResult<CommentEvent> {
        if !self.livestreams.contains_key(&comment.livestream_id) {
            return Err(DomainError::LivestreamNotFound(comment.livestream_id));
        }
        if comment.tip() < 0 {
            return Err(DomainError::NegativeTip(comment.tip()));
        }

        let id = EventId::new(self.next_comment_id.fetch_add(1, Ordering::Relaxed));
        let event = comment.into_event(id);
        tx.comments.push(event.clone());
        Ok(event)
    }

    async fn reactions_by_livestream(
        &self,
        livestream_id: LivestreamId,
    ) -> RepoResult<Vec<ReactionEvent>> {
        Ok(self
            .reactions
            .read()
            .values()
            .filter(|event| event.livestream_id == livestream_id)
            .cloned()
            .collect())
    }

    async fn comments_by_livestream(
        &self,
        livestream_id: LivestreamId,
    ) -> RepoResult<Vec<CommentEvent>> {
        Ok(self
            .comments
            .read()
            .values()
            .filter(|event| event.livestream_id == livestream_id)
            .cloned()
            .collect())
    }
}

// ============================================================================
// Aggregate Store
// ============================================================================

#[async_trait]
impl AggregateStore for MemoryStore {
    #[instrument(skip(self, tx))]
    async fn ensure_row(&self, tx: &mut MemoryTx, user_id: UserId) -> RepoResult<UserScore> {
        if let Some(pending) = tx.deltas.get(&user_id) {
            return Ok(pending.post);
        }
        if let Some(slot) = self.slot(user_id) {
            let row = *slot.committed.read();
            return Ok(row);
        }
        if !self.user_exists(user_id) && !tx.stages_user(user_id) {
            return Err(DomainError::UserNotFound(user_id));
        }

        if !tx.rows.contains(&user_id) {
            tx.rows.push(user_id);
        }
        Ok(UserScore::zero(user_id))
    }

    #[instrument(skip(self, tx))]
    async fn apply_delta(
        &self,
        tx: &mut MemoryTx,
        user_id: UserId,
        delta: ScoreDelta,
    ) -> RepoResult<UserScore> {
        if self.faults.trip(FaultPoint::ApplyDelta) {
            return Err(DomainError::InjectedFault(FaultPoint::ApplyDelta.as_str()));
        }
        if self.faults.trip(FaultPoint::Contention) {
            return Err(DomainError::TransientContention(format!(
                "injected contention on score row {user_id}"
            )));
        }
        if !delta.is_non_negative() {
            return Err(DomainError::NonMonotonicDelta);
        }

        // Row already locked by this transaction
        if let Some(pending) = tx.deltas.get_mut(&user_id) {
            let post = pending
                .post
                .checked_apply(delta)
                .ok_or(DomainError::ScoreOverflow(user_id))?;
            pending.post = post;
            return Ok(post);
        }

        let Some(slot) = self.slot(user_id) else {
            error!(user_id = %user_id, "Score row missing while applying delta");
            return Err(DomainError::ScoreRowMissing(user_id));
        };
        let guard = self
            .lock_row(&slot, || format!("score row {user_id}"))
            .await?;

        // Committed totals cannot move while the writer lock is held
        let base = *slot.committed.read();
        let post = base
            .checked_apply(delta)
            .ok_or(DomainError::ScoreOverflow(user_id))?;

        tx.deltas.insert(
            user_id,
            PendingDelta {
                slot,
                post,
                _guard: guard,
            },
        );
        Ok(post)
    }

    async fn read(&self, user_id: UserId) -> RepoResult<UserScore> {
        let slot = self
            .slot(user_id)
            .ok_or(DomainError::ScoreRowMissing(user_id))?;
        let row = *slot.committed.read();
        Ok(row)
    }

    async fn rank_of(&self, user_id: UserId) -> RepoResult<i64> {
        let me = self.read(user_id).await?;
        let my_name = self
            .users
            .get(&user_id)
            .map(|user| user.name.clone())
            .ok_or(DomainError::UserNotFound(user_id))?;
        let my_key = (me.score(), my_name.as_str());

        let ahead = self
            .scores
            .iter()
            .filter(|entry| {
                let row = *entry.value().committed.read();
                self.users
                    .get(entry.key())
                    .is_some_and(|user| (row.score(), user.name.as_str()) > my_key)
            })
            .count();

        Ok(ahead as i64 + 1)
    }

    async fn total_tip(&self) -> RepoResult<i64> {
        self.scores
            .iter()
            .try_fold(0_i64, |sum, entry| {
                sum.checked_add(entry.value().committed.read().total_tip)
            })
            .ok_or(DomainError::TotalTipOverflow)
    }
}

// ============================================================================
// Livestream Aggregate Store
// ============================================================================

#[async_trait]
impl LivestreamAggregateStore for MemoryStore {
    #[instrument(skip(self, tx))]
    async fn apply_livestream_delta(
        &self,
        tx: &mut MemoryTx,
        livestream_id: LivestreamId,
        delta: ScoreDelta,
    ) -> RepoResult<LivestreamScore> {
        if !delta.is_non_negative() {
            return Err(DomainError::NonMonotonicDelta);
        }

        if let Some(pending) = tx.livestream_deltas.get_mut(&livestream_id) {
            let post = pending
                .post
                .checked_apply(delta)
                .ok_or(DomainError::LivestreamScoreOverflow(livestream_id))?;
            pending.post = post;
            return Ok(post);
        }

        let Some(slot) = self.livestream_slot(livestream_id) else {
            error!(livestream_id = %livestream_id, "Livestream score row missing while applying delta");
            return Err(DomainError::LivestreamScoreRowMissing(livestream_id));
        };
        let guard = self
            .lock_row(&slot, || format!("livestream score row {livestream_id}"))
            .await?;

        let base = *slot.committed.read();
        let post = base
            .checked_apply(delta)
            .ok_or(DomainError::LivestreamScoreOverflow(livestream_id))?;

        tx.livestream_deltas.insert(
            livestream_id,
            PendingDelta {
                slot,
                post,
                _guard: guard,
            },
        );
        Ok(post)
    }

    async fn read_livestream(&self, livestream_id: LivestreamId) -> RepoResult<LivestreamScore> {
        let slot = self
            .livestream_slot(livestream_id)
            .ok_or(DomainError::LivestreamScoreRowMissing(livestream_id))?;
        let row = *slot.committed.read();
        Ok(row)
    }

    async fn livestream_rank_of(&self, livestream_id: LivestreamId) -> RepoResult<i64> {
        let me = self.read_livestream(livestream_id).await?;
        let my_key = (me.score(), livestream_id);

        // Rows of livestreams still being created are not ranked yet
        let ahead = self
            .livestream_scores
            .iter()
            .filter(|entry| self.livestreams.contains_key(entry.key()))
            .filter(|entry| (entry.value().committed.read().score(), *entry.key()) > my_key)
            .count();

        Ok(ahead as i64 + 1)
    }
}
