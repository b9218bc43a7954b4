//! Aggregation engine
//!
//! Appends reactions and comments to the ledger and adds each event's delta
//! to the livestream owner's score row and to the livestream's own row in
//! the same transaction. Either all of it becomes visible or none does, so
//! the score rows always equal what a full scan of the ledger would produce.
//!
//! Concurrency control is the row lock taken by `apply_delta`: writers for
//! the same owner queue on it, writers for different owners never meet.
//! The livestream row is locked second; a livestream has exactly one owner,
//! so every writer takes the two locks in the same order.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::{info, instrument, warn};
use validator::Validate;

use score_core::entities::{
    CommentEvent, LivestreamScore, NewComment, NewReaction, ReactionEvent, ScoreDelta, UserScore,
};
use score_core::traits::{RepoResult, UnitOfWork};
use score_core::value_objects::{LivestreamId, UserId};

use crate::dto::{PostCommentRequest, PostReactionRequest};

use super::context::{ScoreStore, ServiceContext};
use super::error::ServiceResult;

/// Rows as they read after an append commits
struct StagedRows {
    owner: UserScore,
    livestream: LivestreamScore,
}

/// Aggregation engine
pub struct AggregationEngine<'a, S: ScoreStore> {
    ctx: &'a ServiceContext<S>,
}

impl<'a, S: ScoreStore> AggregationEngine<'a, S> {
    /// Create a new AggregationEngine
    pub fn new(ctx: &'a ServiceContext<S>) -> Self {
        Self { ctx }
    }

    /// Append a reaction and count it for the livestream owner
    #[instrument(skip(self, request), fields(emoji = %request.emoji_name))]
    pub async fn append_reaction(
        &self,
        livestream_id: LivestreamId,
        actor_id: UserId,
        request: PostReactionRequest,
    ) -> ServiceResult<ReactionEvent> {
        request.validate()?;

        // Unknown livestream: fail before anything is staged
        let owner_id = self.ctx.store().resolve_owner(livestream_id).await?;
        let reaction = NewReaction::new(livestream_id, actor_id, request.emoji_name);

        let (event, staged) = self
            .with_retry("reaction", || self.try_append_reaction(owner_id, reaction.clone()))
            .await?;

        info!(
            event_id = %event.id,
            livestream_id = %livestream_id,
            owner_id = %owner_id,
            total_reactions = staged.owner.total_reactions,
            livestream_reactions = staged.livestream.total_reactions,
            "Reaction appended"
        );
        Ok(event)
    }

    /// Append a live comment and count it, with its tip, for the livestream owner
    #[instrument(skip(self, request), fields(tip = request.tip))]
    pub async fn append_comment(
        &self,
        livestream_id: LivestreamId,
        actor_id: UserId,
        request: PostCommentRequest,
    ) -> ServiceResult<CommentEvent> {
        request.validate()?;

        let owner_id = self.ctx.store().resolve_owner(livestream_id).await?;
        let comment = NewComment::new(livestream_id, actor_id, request.comment, request.tip)?;

        let (event, staged) = self
            .with_retry("comment", || self.try_append_comment(owner_id, comment.clone()))
            .await?;

        info!(
            event_id = %event.id,
            livestream_id = %livestream_id,
            owner_id = %owner_id,
            tip = event.tip,
            total_tip = staged.owner.total_tip,
            livestream_max_tip = staged.livestream.max_tip,
            "Comment appended"
        );
        Ok(event)
    }

    // === Single attempts ===

    async fn try_append_reaction(
        &self,
        owner_id: UserId,
        reaction: NewReaction,
    ) -> RepoResult<(ReactionEvent, StagedRows)> {
        let store = self.ctx.store();
        let livestream_id = reaction.livestream_id;
        let delta = ScoreDelta::from(&reaction);

        let mut tx = store.begin().await?;
        let staged = match store.append_reaction(&mut tx, reaction).await {
            Ok(event) => self
                .apply_rows(&mut tx, owner_id, livestream_id, delta)
                .await
                .map(|rows| (event, rows)),
            Err(e) => Err(e),
        };
        self.settle(tx, staged).await
    }

    async fn try_append_comment(
        &self,
        owner_id: UserId,
        comment: NewComment,
    ) -> RepoResult<(CommentEvent, StagedRows)> {
        let store = self.ctx.store();
        let livestream_id = comment.livestream_id;
        let delta = ScoreDelta::from(&comment);

        let mut tx = store.begin().await?;
        let staged = match store.append_comment(&mut tx, comment).await {
            Ok(event) => self
                .apply_rows(&mut tx, owner_id, livestream_id, delta)
                .await
                .map(|rows| (event, rows)),
            Err(e) => Err(e),
        };
        self.settle(tx, staged).await
    }

    /// Owner row first, then the livestream row
    async fn apply_rows(
        &self,
        tx: &mut <S as UnitOfWork>::Tx,
        owner_id: UserId,
        livestream_id: LivestreamId,
        delta: ScoreDelta,
    ) -> RepoResult<StagedRows> {
        let store = self.ctx.store();
        let owner = store.apply_delta(tx, owner_id, delta).await?;
        let livestream = store
            .apply_livestream_delta(tx, livestream_id, delta)
            .await?;
        Ok(StagedRows { owner, livestream })
    }

    /// Commit a fully staged attempt, or roll back a failed one
    async fn settle<T>(&self, tx: <S as UnitOfWork>::Tx, staged: RepoResult<T>) -> RepoResult<T> {
        let store = self.ctx.store();
        match staged {
            Ok(value) => {
                store.commit(tx).await?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = store.rollback(tx).await {
                    // The transaction is gone either way; report the cause
                    warn!(error = %rollback_err, cause = %e, "Rollback failed");
                }
                Err(e)
            }
        }
    }

    // === Retry ===

    /// Run `attempt` until it succeeds, fails for a non-transient reason,
    /// or the configured attempts are used up
    async fn with_retry<T, F, Fut>(&self, kind: &'static str, mut attempt: F) -> ServiceResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = RepoResult<T>>,
    {
        let max_attempts = self.ctx.aggregation().max_attempts.max(1);
        let mut tried = 1;
        loop {
            match attempt().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && tried < max_attempts => {
                    let delay = self.backoff(tried);
                    warn!(
                        kind,
                        attempt = tried,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Score row contended, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    tried += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Linear backoff with up to one base interval of jitter
    fn backoff(&self, attempt: u32) -> Duration {
        let base = self.ctx.aggregation().retry_backoff();
        let jitter_ms = if base.is_zero() {
            0
        } else {
            rand::thread_rng().gen_range(0..=base.as_millis() as u64)
        };
        base * attempt + Duration::from_millis(jitter_ms)
    }
}
