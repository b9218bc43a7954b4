//! User service
//!
//! Registers users. The score row is created in the same transaction as
//! the user, so no user is ever visible without one.

use tracing::{info, instrument, warn};
use validator::Validate;

use score_core::entities::{NewUser, User};
use score_core::traits::{AggregateStore, UnitOfWork, UserRepository};
use score_core::value_objects::UserId;

use crate::dto::RegisterUserRequest;

use super::context::{ScoreStore, ServiceContext};
use super::error::{ServiceError, ServiceResult};

/// User service
pub struct UserService<'a, S: ScoreStore> {
    ctx: &'a ServiceContext<S>,
}

impl<'a, S: ScoreStore> UserService<'a, S> {
    /// Create a new UserService
    pub fn new(ctx: &'a ServiceContext<S>) -> Self {
        Self { ctx }
    }

    /// Create a user together with its zeroed score row
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn register(&self, request: RegisterUserRequest) -> ServiceResult<User> {
        request.validate()?;

        let store = self.ctx.store();
        let mut tx = store.begin().await?;

        let staged = match UserRepository::create(
            store,
            &mut tx,
            NewUser::new(request.name, request.display_name),
        )
        .await
        {
            Ok(user) => store.ensure_row(&mut tx, user.id).await.map(|_| user),
            Err(e) => Err(e),
        };

        let user = match staged {
            Ok(user) => user,
            Err(e) => {
                if let Err(rollback_err) = store.rollback(tx).await {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                return Err(e.into());
            }
        };
        store.commit(tx).await?;

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Get a user by ID
    pub async fn get_user(&self, user_id: UserId) -> ServiceResult<User> {
        UserRepository::find_by_id(self.ctx.store(), user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id.to_string()))
    }

    /// Get a user by unique name
    pub async fn get_user_by_name(&self, name: &str) -> ServiceResult<User> {
        self.ctx
            .store()
            .find_by_name(name)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use score_common::AggregationConfig;
    use score_core::entities::UserScore;
    use score_db::{FaultPoint, MemoryStore};

    fn context() -> ServiceContext<MemoryStore> {
        ServiceContext::new(Arc::new(MemoryStore::new()), AggregationConfig::default())
    }

    fn request(name: &str) -> RegisterUserRequest {
        RegisterUserRequest {
            name: name.to_string(),
            display_name: name.to_uppercase(),
        }
    }

    #[tokio::test]
    async fn test_register_creates_zero_row() {
        let ctx = context();
        let user = UserService::new(&ctx).register(request("alice")).await.unwrap();

        assert_eq!(ctx.store().read(user.id).await.unwrap(), UserScore::zero(user.id));
        assert_eq!(
            UserService::new(&ctx).get_user_by_name("alice").await.unwrap().id,
            user.id
        );
    }

    #[tokio::test]
    async fn test_duplicate_name_conflicts() {
        let ctx = context();
        let service = UserService::new(&ctx);
        service.register(request("bob")).await.unwrap();

        let err = service.register(request("bob")).await.unwrap_err();
        assert_eq!(err.status_code(), 409);
    }

    #[tokio::test]
    async fn test_failed_commit_leaves_no_user() {
        let ctx = context();
        ctx.store().faults().arm(FaultPoint::Commit, 1);
        let service = UserService::new(&ctx);

        assert!(service.register(request("carol")).await.is_err());
        let err = service.get_user_by_name("carol").await.unwrap_err();
        assert_eq!(err.status_code(), 404);

        // The name is free again
        service.register(request("carol")).await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_name_is_rejected() {
        let ctx = context();
        let err = UserService::new(&ctx).register(request("")).await.unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }
}
