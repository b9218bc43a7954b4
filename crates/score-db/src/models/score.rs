//! Score row database models

use sqlx::FromRow;

/// Database model for user_scores table
#[derive(Debug, Clone, Copy, FromRow)]
pub struct UserScoreModel {
    pub user_id: i64,
    pub total_reactions: i64,
    pub total_tip: i64,
    pub total_livecomments: i64,
}

/// Database model for livestream_scores table
#[derive(Debug, Clone, Copy, FromRow)]
pub struct LivestreamScoreModel {
    pub livestream_id: i64,
    pub total_reactions: i64,
    pub total_tip: i64,
    pub total_livecomments: i64,
    pub max_tip: i64,
}
