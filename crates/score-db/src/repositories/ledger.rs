//! PostgreSQL implementation of EventLedger

use async_trait::async_trait;
use tracing::instrument;

use score_core::entities::{CommentEvent, NewComment, NewReaction, ReactionEvent};
use score_core::error::DomainError;
use score_core::traits::{EventLedger, RepoResult};
use score_core::value_objects::LivestreamId;

use crate::models::{CommentModel, ReactionModel};

use super::error::{map_db_error, map_foreign_key_violation};
use super::store::{PgStore, PgTx};

#[async_trait]
impl EventLedger for PgStore {
    #[instrument(skip(self, tx))]
    async fn append_reaction(&self, tx: &mut PgTx, reaction: NewReaction) -> RepoResult<ReactionEvent> {
        let livestream_id = reaction.livestream_id;
        let model = sqlx::query_as::<_, ReactionModel>(
            r#"
            INSERT INTO reactions (livestream_id, user_id, emoji_name, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, livestream_id, user_id, emoji_name, created_at
            "#,
        )
        .bind(livestream_id.into_inner())
        .bind(reaction.actor_id.into_inner())
        .bind(&reaction.emoji_name)
        .bind(reaction.created_at)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| map_foreign_key_violation(e, || DomainError::LivestreamNotFound(livestream_id)))?;

        Ok(ReactionEvent::from(model))
    }

    #[instrument(skip(self, tx))]
    async fn append_comment(&self, tx: &mut PgTx, comment: NewComment) -> RepoResult<CommentEvent> {
        let livestream_id = comment.livestream_id;
        let model = sqlx::query_as::<_, CommentModel>(
            r#"
            INSERT INTO livecomments (livestream_id, user_id, comment, tip, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, livestream_id, user_id, comment, tip, created_at
            "#,
        )
        .bind(livestream_id.into_inner())
        .bind(comment.actor_id.into_inner())
        .bind(&comment.comment)
        .bind(comment.tip())
        .bind(comment.created_at)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| map_foreign_key_violation(e, || DomainError::LivestreamNotFound(livestream_id)))?;

        Ok(CommentEvent::from(model))
    }

    #[instrument(skip(self))]
    async fn reactions_by_livestream(&self, livestream_id: LivestreamId) -> RepoResult<Vec<ReactionEvent>> {
        let results = sqlx::query_as::<_, ReactionModel>(
            r#"
            SELECT id, livestream_id, user_id, emoji_name, created_at
            FROM reactions
            WHERE livestream_id = $1
            ORDER BY id
            "#,
        )
        .bind(livestream_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(ReactionEvent::from).collect())
    }

    #[instrument(skip(self))]
    async fn comments_by_livestream(&self, livestream_id: LivestreamId) -> RepoResult<Vec<CommentEvent>> {
        let results = sqlx::query_as::<_, CommentModel>(
            r#"
            SELECT id, livestream_id, user_id, comment, tip, created_at
            FROM livecomments
            WHERE livestream_id = $1
            ORDER BY id
            "#,
        )
        .bind(livestream_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(CommentEvent::from).collect())
    }
}
