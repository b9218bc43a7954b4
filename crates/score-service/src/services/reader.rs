//! Score reader
//!
//! Serves statistics straight from the score rows. Never scans the ledger.

use tracing::instrument;

use score_core::traits::{
    AggregateStore, LivestreamAggregateStore, LivestreamRepository, UserRepository,
};
use score_core::value_objects::{LivestreamId, UserId};

use crate::dto::{
    LivestreamStatisticsResponse, PaymentResultResponse, ScoreResponse, UserStatisticsResponse,
};

use super::context::{ScoreStore, ServiceContext};
use super::error::{ServiceError, ServiceResult};

/// Score reader
pub struct ScoreReader<'a, S: ScoreStore> {
    ctx: &'a ServiceContext<S>,
}

impl<'a, S: ScoreStore> ScoreReader<'a, S> {
    /// Create a new ScoreReader
    pub fn new(ctx: &'a ServiceContext<S>) -> Self {
        Self { ctx }
    }

    /// Committed totals for one user
    #[instrument(skip(self))]
    pub async fn read_aggregate(&self, user_id: UserId) -> ServiceResult<ScoreResponse> {
        let row = self.ctx.store().read(user_id).await?;
        Ok(ScoreResponse::from(row))
    }

    /// Rank and totals for the user with the given name
    #[instrument(skip(self))]
    pub async fn user_statistics(&self, user_name: &str) -> ServiceResult<UserStatisticsResponse> {
        let store = self.ctx.store();
        let user = store
            .find_by_name(user_name)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_name))?;

        let row = store.read(user.id).await?;
        let rank = store.rank_of(user.id).await?;
        Ok(UserStatisticsResponse::new(rank, row))
    }

    /// Rank and totals for one livestream
    #[instrument(skip(self))]
    pub async fn livestream_statistics(
        &self,
        livestream_id: LivestreamId,
    ) -> ServiceResult<LivestreamStatisticsResponse> {
        let store = self.ctx.store();
        if LivestreamRepository::find_by_id(store, livestream_id)
            .await?
            .is_none()
        {
            return Err(ServiceError::not_found("Livestream", livestream_id.to_string()));
        }

        let row = store.read_livestream(livestream_id).await?;
        let rank = store.livestream_rank_of(livestream_id).await?;
        Ok(LivestreamStatisticsResponse::new(rank, row))
    }

    /// Tips received across all users
    #[instrument(skip(self))]
    pub async fn payment_result(&self) -> ServiceResult<PaymentResultResponse> {
        let total_tip = self.ctx.store().total_tip().await?;
        Ok(PaymentResultResponse { total_tip })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use score_common::AggregationConfig;
    use score_db::MemoryStore;

    use crate::dto::{CreateLivestreamRequest, PostCommentRequest, PostReactionRequest, RegisterUserRequest};
    use crate::services::{AggregationEngine, LivestreamService, UserService};

    fn context() -> ServiceContext<MemoryStore> {
        ServiceContext::new(Arc::new(MemoryStore::new()), AggregationConfig::default())
    }

    async fn streamer(ctx: &ServiceContext<MemoryStore>, name: &str) -> (UserId, score_core::LivestreamId) {
        let user = UserService::new(ctx)
            .register(RegisterUserRequest {
                name: name.to_string(),
                display_name: name.to_string(),
            })
            .await
            .unwrap();
        let livestream = LivestreamService::new(ctx)
            .create(
                user.id,
                CreateLivestreamRequest {
                    title: format!("{name} live"),
                },
            )
            .await
            .unwrap();
        (user.id, livestream.id)
    }

    #[tokio::test]
    async fn test_statistics_and_payment() {
        let ctx = context();
        let (alice, alice_live) = streamer(&ctx, "alice").await;
        let (_, bob_live) = streamer(&ctx, "bob").await;
        let engine = AggregationEngine::new(&ctx);

        engine
            .append_reaction(
                alice_live,
                alice,
                PostReactionRequest {
                    emoji_name: "tada".to_string(),
                },
            )
            .await
            .unwrap();
        engine
            .append_comment(
                bob_live,
                alice,
                PostCommentRequest {
                    comment: "here you go".to_string(),
                    tip: 30,
                },
            )
            .await
            .unwrap();

        let reader = ScoreReader::new(&ctx);
        let bob_stats = reader.user_statistics("bob").await.unwrap();
        assert_eq!(bob_stats.rank, 1);
        assert_eq!(bob_stats.total_tip, 30);
        assert_eq!(bob_stats.total_livecomments, 1);

        let alice_stats = reader.user_statistics("alice").await.unwrap();
        assert_eq!(alice_stats.rank, 2);
        assert_eq!(alice_stats.total_reactions, 1);

        assert_eq!(reader.read_aggregate(alice).await.unwrap().total_reactions, 1);
        assert_eq!(reader.payment_result().await.unwrap().total_tip, 30);
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let ctx = context();
        let reader = ScoreReader::new(&ctx);

        let err = reader.user_statistics("ghost").await.unwrap_err();
        assert_eq!(err.status_code(), 404);
        let err = reader
            .livestream_statistics(score_core::LivestreamId::new(5))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
        assert_eq!(reader.payment_result().await.unwrap().total_tip, 0);
    }

    #[tokio::test]
    async fn test_livestream_statistics() {
        let ctx = context();
        let (alice, alice_live) = streamer(&ctx, "alice").await;
        let (bob, bob_live) = streamer(&ctx, "bob").await;
        let engine = AggregationEngine::new(&ctx);

        for tip in [20, 80] {
            engine
                .append_comment(
                    alice_live,
                    bob,
                    PostCommentRequest {
                        comment: "nice".to_string(),
                        tip,
                    },
                )
                .await
                .unwrap();
        }
        engine
            .append_reaction(
                bob_live,
                alice,
                PostReactionRequest {
                    emoji_name: "wave".to_string(),
                },
            )
            .await
            .unwrap();

        let reader = ScoreReader::new(&ctx);
        let alice_stats = reader.livestream_statistics(alice_live).await.unwrap();
        assert_eq!(alice_stats.rank, 1);
        assert_eq!(alice_stats.total_livecomments, 2);
        assert_eq!(alice_stats.total_tip, 100);
        assert_eq!(alice_stats.max_tip, 80);
        assert_eq!(alice_stats.total_reactions, 0);

        let bob_stats = reader.livestream_statistics(bob_live).await.unwrap();
        assert_eq!(bob_stats.rank, 2);
        assert_eq!(bob_stats.total_reactions, 1);
        assert_eq!(bob_stats.max_tip, 0);
    }

    #[tokio::test]
    async fn test_payment_result_overflow_is_internal() {
        let ctx = context();
        for name in ["alice", "bob"] {
            let (_, live) = streamer(&ctx, name).await;
            AggregationEngine::new(&ctx)
                .append_comment(
                    live,
                    UserId::new(1),
                    PostCommentRequest {
                        comment: "all in".to_string(),
                        tip: i64::MAX,
                    },
                )
                .await
                .unwrap();
        }

        let err = ScoreReader::new(&ctx).payment_result().await.unwrap_err();
        assert_eq!(err.status_code(), 500);
    }
}
