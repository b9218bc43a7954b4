//! Live comment event - a chat comment, optionally carrying a paid tip

use chrono::{DateTime, Utc};

use crate::error::DomainError;
use crate::value_objects::{EventId, LivestreamId, UserId};

/// Live comment ledger entry
///
/// Append-only. Counts +1 towards the owner's `total_livecomments` and
/// `tip` towards the owner's `total_tip`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentEvent {
    pub id: EventId,
    pub livestream_id: LivestreamId,
    pub actor_id: UserId,
    pub comment: String,
    pub tip: i64,
    pub created_at: DateTime<Utc>,
}

/// A comment waiting to be appended to the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub livestream_id: LivestreamId,
    pub actor_id: UserId,
    pub comment: String,
    tip: i64,
    pub created_at: DateTime<Utc>,
}

impl NewComment {
    /// Create a comment; a negative tip is rejected
    pub fn new(
        livestream_id: LivestreamId,
        actor_id: UserId,
        comment: impl Into<String>,
        tip: i64,
    ) -> Result<Self, DomainError> {
        if tip < 0 {
            return Err(DomainError::NegativeTip(tip));
        }
        Ok(Self {
            livestream_id,
            actor_id,
            comment: comment.into(),
            tip,
            created_at: Utc::now(),
        })
    }

    #[inline]
    pub fn tip(&self) -> i64 {
        self.tip
    }

    pub fn into_event(self, id: EventId) -> CommentEvent {
        CommentEvent {
            id,
            livestream_id: self.livestream_id,
            actor_id: self.actor_id,
            comment: self.comment,
            tip: self.tip,
            created_at: self.created_at,
        }
    }
}
