//! Live comment database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for livecomments table
#[derive(Debug, Clone, FromRow)]
pub struct CommentModel {
    pub id: i64,
    pub livestream_id: i64,
    pub user_id: i64,
    pub comment: String,
    pub tip: i64,
    pub created_at: DateTime<Utc>,
}
