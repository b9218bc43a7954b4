//! User entity - a streamer or viewer account

use chrono::{DateTime, Utc};

use crate::value_objects::UserId;

/// User entity
///
/// Created once and never mutated by the scoring subsystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

/// A user that has not been persisted yet; the store assigns the id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

impl NewUser {
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            created_at: Utc::now(),
        }
    }

    /// Attach the id assigned by the store
    pub fn into_user(self, id: UserId) -> User {
        User {
            id,
            name: self.name,
            display_name: self.display_name,
            created_at: self.created_at,
        }
    }
}
