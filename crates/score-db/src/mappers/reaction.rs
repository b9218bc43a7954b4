//! Reaction model -> entity mapper

use score_core::entities::ReactionEvent;
use score_core::value_objects::{EventId, LivestreamId, UserId};

use crate::models::ReactionModel;

impl From<ReactionModel> for ReactionEvent {
    fn from(model: ReactionModel) -> Self {
        ReactionEvent {
            id: EventId::new(model.id),
            livestream_id: LivestreamId::new(model.livestream_id),
            actor_id: UserId::new(model.user_id),
            emoji_name: model.emoji_name,
            created_at: model.created_at,
        }
    }
}
