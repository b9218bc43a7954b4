//! Test fixtures and data generators
//!
//! Provides reusable request data for integration tests.

use std::sync::atomic::{AtomicU64, Ordering};

use score_common::AggregationConfig;
use score_service::dto::{PostCommentRequest, PostReactionRequest, RegisterUserRequest};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Registration request with a name unique within this process
pub fn unique_user(prefix: &str) -> RegisterUserRequest {
    let suffix = unique_suffix();
    RegisterUserRequest {
        name: format!("{prefix}{suffix}"),
        display_name: format!("{prefix} {suffix}"),
    }
}

pub fn reaction(emoji: &str) -> PostReactionRequest {
    PostReactionRequest {
        emoji_name: emoji.to_string(),
    }
}

pub fn comment(text: &str, tip: i64) -> PostCommentRequest {
    PostCommentRequest {
        comment: text.to_string(),
        tip,
    }
}

/// Aggregation settings with short waits so contention tests finish fast
pub fn fast_retry(max_attempts: u32, lock_timeout_ms: u64) -> AggregationConfig {
    AggregationConfig {
        max_attempts,
        retry_backoff_ms: 5,
        lock_timeout_ms,
    }
}

/// One event a test submits, before it is sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedEvent {
    Reaction { streamer: usize },
    Comment { streamer: usize, tip: i64 },
}

impl PlannedEvent {
    pub fn streamer(&self) -> usize {
        match self {
            Self::Reaction { streamer } | Self::Comment { streamer, .. } => *streamer,
        }
    }
}
