//! Response DTOs for score reads
//!
//! All response DTOs implement `Serialize` for JSON output. Every value comes
//! from the score rows, never from scanning the ledger.

use serde::Serialize;

use score_core::entities::{LivestreamScore, UserScore};

/// Totals of one user's score row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreResponse {
    pub total_reactions: i64,
    pub total_tip: i64,
    pub total_livecomments: i64,
}

impl From<UserScore> for ScoreResponse {
    fn from(row: UserScore) -> Self {
        Self {
            total_reactions: row.total_reactions,
            total_tip: row.total_tip,
            total_livecomments: row.total_livecomments,
        }
    }
}

/// Per-user statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UserStatisticsResponse {
    pub rank: i64,
    pub total_reactions: i64,
    pub total_livecomments: i64,
    pub total_tip: i64,
}

impl UserStatisticsResponse {
    pub fn new(rank: i64, row: UserScore) -> Self {
        Self {
            rank,
            total_reactions: row.total_reactions,
            total_livecomments: row.total_livecomments,
            total_tip: row.total_tip,
        }
    }
}

/// Per-livestream statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LivestreamStatisticsResponse {
    pub rank: i64,
    pub total_reactions: i64,
    pub total_livecomments: i64,
    pub total_tip: i64,
    pub max_tip: i64,
}

impl LivestreamStatisticsResponse {
    pub fn new(rank: i64, row: LivestreamScore) -> Self {
        Self {
            rank,
            total_reactions: row.total_reactions,
            total_livecomments: row.total_livecomments,
            total_tip: row.total_tip,
            max_tip: row.max_tip,
        }
    }
}

/// Tips received across every user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaymentResultResponse {
    pub total_tip: i64,
}
