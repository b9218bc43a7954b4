//! Livestream model -> entity mapper

use score_core::entities::Livestream;
use score_core::value_objects::{LivestreamId, UserId};

use crate::models::LivestreamModel;

impl From<LivestreamModel> for Livestream {
    fn from(model: LivestreamModel) -> Self {
        Livestream {
            id: LivestreamId::new(model.id),
            owner_id: UserId::new(model.user_id),
            title: model.title,
            created_at: model.created_at,
        }
    }
}
