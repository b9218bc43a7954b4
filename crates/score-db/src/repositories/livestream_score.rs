//! PostgreSQL implementation of LivestreamAggregateStore

use async_trait::async_trait;
use tracing::{error, instrument};

use score_core::entities::{LivestreamScore, ScoreDelta};
use score_core::error::DomainError;
use score_core::traits::{LivestreamAggregateStore, RepoResult};
use score_core::value_objects::LivestreamId;

use crate::models::LivestreamScoreModel;

use super::error::{is_out_of_range, map_db_error};
use super::store::{PgStore, PgTx};

#[async_trait]
impl LivestreamAggregateStore for PgStore {
    #[instrument(skip(self, tx))]
    async fn apply_livestream_delta(
        &self,
        tx: &mut PgTx,
        livestream_id: LivestreamId,
        delta: ScoreDelta,
    ) -> RepoResult<LivestreamScore> {
        if !delta.is_non_negative() {
            return Err(DomainError::NonMonotonicDelta);
        }

        let model = sqlx::query_as::<_, LivestreamScoreModel>(
            r#"
            UPDATE livestream_scores
            SET total_reactions = total_reactions + $2,
                total_tip = total_tip + $3,
                total_livecomments = total_livecomments + $4,
                max_tip = GREATEST(max_tip, $3)
            WHERE livestream_id = $1
            RETURNING livestream_id, total_reactions, total_tip, total_livecomments, max_tip
            "#,
        )
        .bind(livestream_id.into_inner())
        .bind(delta.reactions)
        .bind(delta.tip)
        .bind(delta.livecomments)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| {
            if is_out_of_range(&e) {
                DomainError::LivestreamScoreOverflow(livestream_id)
            } else {
                map_db_error(e)
            }
        })?;

        match model {
            Some(model) => Ok(LivestreamScore::from(model)),
            None => {
                error!(livestream_id = %livestream_id, "Livestream score row missing while applying delta");
                Err(DomainError::LivestreamScoreRowMissing(livestream_id))
            }
        }
    }

    #[instrument(skip(self))]
    async fn read_livestream(&self, livestream_id: LivestreamId) -> RepoResult<LivestreamScore> {
        let model = sqlx::query_as::<_, LivestreamScoreModel>(
            r#"
            SELECT livestream_id, total_reactions, total_tip, total_livecomments, max_tip
            FROM livestream_scores
            WHERE livestream_id = $1
            "#,
        )
        .bind(livestream_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        model
            .map(LivestreamScore::from)
            .ok_or(DomainError::LivestreamScoreRowMissing(livestream_id))
    }

    #[instrument(skip(self))]
    async fn livestream_rank_of(&self, livestream_id: LivestreamId) -> RepoResult<i64> {
        self.read_livestream(livestream_id).await?;

        let rank = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) + 1
            FROM livestream_scores s
            CROSS JOIN (
                SELECT total_reactions + total_tip AS score
                FROM livestream_scores
                WHERE livestream_id = $1
            ) me
            WHERE (s.total_reactions + s.total_tip, s.livestream_id) > (me.score, $1)
            "#,
        )
        .bind(livestream_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rank)
    }
}
