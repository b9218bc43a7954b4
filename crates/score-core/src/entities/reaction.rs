//! Reaction event - an emoji reaction sent to a livestream

use chrono::{DateTime, Utc};

use crate::value_objects::{EventId, LivestreamId, UserId};

/// Reaction ledger entry
///
/// Append-only. Counts +1 towards the livestream owner's `total_reactions`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionEvent {
    pub id: EventId,
    pub livestream_id: LivestreamId,
    /// The viewer who reacted, not the owner being credited
    pub actor_id: UserId,
    pub emoji_name: String,
    pub created_at: DateTime<Utc>,
}

/// A reaction waiting to be appended to the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReaction {
    pub livestream_id: LivestreamId,
    pub actor_id: UserId,
    pub emoji_name: String,
    pub created_at: DateTime<Utc>,
}

impl NewReaction {
    pub fn new(livestream_id: LivestreamId, actor_id: UserId, emoji_name: impl Into<String>) -> Self {
        Self {
            livestream_id,
            actor_id,
            emoji_name: emoji_name.into(),
            created_at: Utc::now(),
        }
    }

    /// Attach the ledger sequence number
    pub fn into_event(self, id: EventId) -> ReactionEvent {
        ReactionEvent {
            id,
            livestream_id: self.livestream_id,
            actor_id: self.actor_id,
            emoji_name: self.emoji_name,
            created_at: self.created_at,
        }
    }
}
