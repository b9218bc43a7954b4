//! Live comment model -> entity mapper

use score_core::entities::CommentEvent;
use score_core::value_objects::{EventId, LivestreamId, UserId};

use crate::models::CommentModel;

impl From<CommentModel> for CommentEvent {
    fn from(model: CommentModel) -> Self {
        CommentEvent {
            id: EventId::new(model.id),
            livestream_id: LivestreamId::new(model.livestream_id),
            actor_id: UserId::new(model.user_id),
            comment: model.comment,
            tip: model.tip,
            created_at: model.created_at,
        }
    }
}
