//! Livestream service
//!
//! Registers livestreams. A livestream's owner is fixed at creation and is
//! the user every event on it is credited to.

use tracing::{info, instrument};
use validator::Validate;

use score_core::entities::{Livestream, NewLivestream};
use score_core::traits::{LivestreamRepository, UserRepository};
use score_core::value_objects::{LivestreamId, UserId};

use crate::dto::CreateLivestreamRequest;

use super::context::{ScoreStore, ServiceContext};
use super::error::{ServiceError, ServiceResult};

/// Livestream service
pub struct LivestreamService<'a, S: ScoreStore> {
    ctx: &'a ServiceContext<S>,
}

impl<'a, S: ScoreStore> LivestreamService<'a, S> {
    /// Create a new LivestreamService
    pub fn new(ctx: &'a ServiceContext<S>) -> Self {
        Self { ctx }
    }

    /// Create a livestream owned by `owner_id`
    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        owner_id: UserId,
        request: CreateLivestreamRequest,
    ) -> ServiceResult<Livestream> {
        request.validate()?;

        let livestream = LivestreamRepository::create(
            self.ctx.store(),
            NewLivestream::new(owner_id, request.title),
        )
        .await?;

        info!(livestream_id = %livestream.id, owner_id = %owner_id, "Livestream created");
        Ok(livestream)
    }

    /// Get a livestream by ID
    pub async fn get(&self, livestream_id: LivestreamId) -> ServiceResult<Livestream> {
        LivestreamRepository::find_by_id(self.ctx.store(), livestream_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Livestream", livestream_id.to_string()))
    }

    /// Livestreams owned by a user, oldest first
    pub async fn find_by_owner(&self, owner_id: UserId) -> ServiceResult<Vec<Livestream>> {
        if UserRepository::find_by_id(self.ctx.store(), owner_id)
            .await?
            .is_none()
        {
            return Err(ServiceError::not_found("User", owner_id.to_string()));
        }
        Ok(self.ctx.store().find_by_owner(owner_id).await?)
    }
}
