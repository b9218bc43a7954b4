//! PostgreSQL implementation of AggregateStore

use async_trait::async_trait;
use tracing::{error, instrument};

use score_core::entities::{ScoreDelta, UserScore};
use score_core::error::DomainError;
use score_core::traits::{AggregateStore, RepoResult};
use score_core::value_objects::UserId;

use crate::models::UserScoreModel;

use super::error::{map_db_error, map_foreign_key_violation};
use super::store::{PgStore, PgTx};

use super::error::is_out_of_range;

#[async_trait]
impl AggregateStore for PgStore {
    #[instrument(skip(self, tx))]
    async fn ensure_row(&self, tx: &mut PgTx, user_id: UserId) -> RepoResult<UserScore> {
        sqlx::query(
            r#"
            INSERT INTO user_scores (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_id.into_inner())
        .execute(&mut **tx)
        .await
        .map_err(|e| map_foreign_key_violation(e, || DomainError::UserNotFound(user_id)))?;

        let model = sqlx::query_as::<_, UserScoreModel>(
            r#"
            SELECT user_id, total_reactions, total_tip, total_livecomments
            FROM user_scores
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.into_inner())
        .fetch_one(&mut **tx)
        .await
        .map_err(map_db_error)?;

        Ok(UserScore::from(model))
    }

    #[instrument(skip(self, tx))]
    async fn apply_delta(
        &self,
        tx: &mut PgTx,
        user_id: UserId,
        delta: ScoreDelta,
    ) -> RepoResult<UserScore> {
        if !delta.is_non_negative() {
            return Err(DomainError::NonMonotonicDelta);
        }

        // The UPDATE takes the row lock and keeps it until the transaction ends
        let model = sqlx::query_as::<_, UserScoreModel>(
            r#"
            UPDATE user_scores
            SET total_reactions = total_reactions + $2,
                total_tip = total_tip + $3,
                total_livecomments = total_livecomments + $4
            WHERE user_id = $1
            RETURNING user_id, total_reactions, total_tip, total_livecomments
            "#,
        )
        .bind(user_id.into_inner())
        .bind(delta.reactions)
        .bind(delta.tip)
        .bind(delta.livecomments)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| {
            if is_out_of_range(&e) {
                DomainError::ScoreOverflow(user_id)
            } else {
                map_db_error(e)
            }
        })?;

        match model {
            Some(model) => Ok(UserScore::from(model)),
            None => {
                error!(user_id = %user_id, "Score row missing while applying delta");
                Err(DomainError::ScoreRowMissing(user_id))
            }
        }
    }

    #[instrument(skip(self))]
    async fn read(&self, user_id: UserId) -> RepoResult<UserScore> {
        let model = sqlx::query_as::<_, UserScoreModel>(
            r#"
            SELECT user_id, total_reactions, total_tip, total_livecomments
            FROM user_scores
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        model
            .map(UserScore::from)
            .ok_or(DomainError::ScoreRowMissing(user_id))
    }

    #[instrument(skip(self))]
    async fn rank_of(&self, user_id: UserId) -> RepoResult<i64> {
        // Surface a missing row instead of ranking a phantom user
        self.read(user_id).await?;

        let rank = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) + 1
            FROM user_scores s
            INNER JOIN users u ON u.id = s.user_id
            CROSS JOIN (
                SELECT s2.total_reactions + s2.total_tip AS score, u2.name
                FROM user_scores s2
                INNER JOIN users u2 ON u2.id = s2.user_id
                WHERE s2.user_id = $1
            ) me
            WHERE (s.total_reactions + s.total_tip, u.name) > (me.score, me.name)
            "#,
        )
        .bind(user_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rank)
    }

    #[instrument(skip(self))]
    async fn total_tip(&self) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COALESCE(SUM(total_tip), 0)::BIGINT FROM user_scores
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_out_of_range(&e) {
                DomainError::TotalTipOverflow
            } else {
                map_db_error(e)
            }
        })
    }
}
