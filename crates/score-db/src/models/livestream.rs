//! Livestream database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for livestreams table
#[derive(Debug, Clone, FromRow)]
pub struct LivestreamModel {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
}
