//! PostgreSQL implementation of LivestreamRepository and OwnershipResolver

use async_trait::async_trait;
use tracing::instrument;

use score_core::entities::{Livestream, NewLivestream};
use score_core::error::DomainError;
use score_core::traits::{LivestreamRepository, OwnershipResolver, RepoResult};
use score_core::value_objects::{LivestreamId, UserId};

use crate::models::LivestreamModel;

use super::error::{map_db_error, map_foreign_key_violation};
use super::store::PgStore;

#[async_trait]
impl OwnershipResolver for PgStore {
    #[instrument(skip(self))]
    async fn resolve_owner(&self, livestream_id: LivestreamId) -> RepoResult<UserId> {
        let owner = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT user_id FROM livestreams WHERE id = $1
            "#,
        )
        .bind(livestream_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        owner
            .map(UserId::new)
            .ok_or(DomainError::LivestreamNotFound(livestream_id))
    }
}

#[async_trait]
impl LivestreamRepository for PgStore {
    #[instrument(skip(self))]
    async fn create(&self, livestream: NewLivestream) -> RepoResult<Livestream> {
        let owner_id = livestream.owner_id;
        // One statement, so the livestream is never visible without its row
        let model = sqlx::query_as::<_, LivestreamModel>(
            r#"
            WITH inserted AS (
                INSERT INTO livestreams (user_id, title, created_at)
                VALUES ($1, $2, $3)
                RETURNING id, user_id, title, created_at
            ), score_row AS (
                INSERT INTO livestream_scores (livestream_id)
                SELECT id FROM inserted
            )
            SELECT id, user_id, title, created_at FROM inserted
            "#,
        )
        .bind(owner_id.into_inner())
        .bind(&livestream.title)
        .bind(livestream.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_foreign_key_violation(e, || DomainError::UserNotFound(owner_id)))?;

        Ok(Livestream::from(model))
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: LivestreamId) -> RepoResult<Option<Livestream>> {
        let result = sqlx::query_as::<_, LivestreamModel>(
            r#"
            SELECT id, user_id, title, created_at
            FROM livestreams
            WHERE id = $1
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Livestream::from))
    }

    #[instrument(skip(self))]
    async fn find_by_owner(&self, owner_id: UserId) -> RepoResult<Vec<Livestream>> {
        let results = sqlx::query_as::<_, LivestreamModel>(
            r#"
            SELECT id, user_id, title, created_at
            FROM livestreams
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(owner_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Livestream::from).collect())
    }
}
