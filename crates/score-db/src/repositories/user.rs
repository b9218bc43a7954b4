//! PostgreSQL implementation of UserRepository

use async_trait::async_trait;
use tracing::instrument;

use score_core::entities::{NewUser, User};
use score_core::error::DomainError;
use score_core::traits::{RepoResult, UserRepository};
use score_core::value_objects::UserId;

use crate::models::UserModel;

use super::error::{map_db_error, map_unique_violation};
use super::store::{PgStore, PgTx};

#[async_trait]
impl UserRepository for PgStore {
    #[instrument(skip(self, tx))]
    async fn create(&self, tx: &mut PgTx, user: NewUser) -> RepoResult<User> {
        let model = sqlx::query_as::<_, UserModel>(
            r#"
            INSERT INTO users (name, display_name, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, name, display_name, created_at
            "#,
        )
        .bind(&user.name)
        .bind(&user.display_name)
        .bind(user.created_at)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::UserAlreadyExists(user.name.clone())))?;

        Ok(User::from(model))
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        let result = sqlx::query_as::<_, UserModel>(
            r#"
            SELECT id, name, display_name, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(User::from))
    }

    #[instrument(skip(self))]
    async fn find_by_name(&self, name: &str) -> RepoResult<Option<User>> {
        let result = sqlx::query_as::<_, UserModel>(
            r#"
            SELECT id, name, display_name, created_at
            FROM users
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(User::from))
    }
}
