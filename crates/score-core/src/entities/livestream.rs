//! Livestream entity - only its owner matters to scoring

use chrono::{DateTime, Utc};

use crate::value_objects::{LivestreamId, UserId};

/// Livestream entity
///
/// Ownership is fixed for the lifetime of the livestream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Livestream {
    pub id: LivestreamId,
    pub owner_id: UserId,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl Livestream {
    /// Check if the given user owns this livestream
    #[inline]
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }
}

/// A livestream that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLivestream {
    pub owner_id: UserId,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl NewLivestream {
    pub fn new(owner_id: UserId, title: impl Into<String>) -> Self {
        Self {
            owner_id,
            title: title.into(),
            created_at: Utc::now(),
        }
    }

    pub fn into_livestream(self, id: LivestreamId) -> Livestream {
        Livestream {
            id,
            owner_id: self.owner_id,
            title: self.title,
            created_at: self.created_at,
        }
    }
}
