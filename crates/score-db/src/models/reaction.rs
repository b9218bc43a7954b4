//! Reaction database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for reactions table
#[derive(Debug, Clone, FromRow)]
pub struct ReactionModel {
    pub id: i64,
    pub livestream_id: i64,
    pub user_id: i64,
    pub emoji_name: String,
    pub created_at: DateTime<Utc>,
}
