//! Request DTOs
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.

use serde::Deserialize;
use validator::Validate;

// ============================================================================
// User and Livestream Requests
// ============================================================================

/// User registration request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterUserRequest {
    #[validate(length(min = 1, max = 64, message = "Name must be 1-64 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 64, message = "Display name must be 1-64 characters"))]
    pub display_name: String,
}

/// Create livestream request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateLivestreamRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,
}

// ============================================================================
// Event Requests
// ============================================================================

/// Post a reaction to a livestream
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PostReactionRequest {
    #[validate(length(min = 1, max = 64, message = "Emoji name must be 1-64 characters"))]
    pub emoji_name: String,
}

/// Post a live comment, optionally with a tip
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PostCommentRequest {
    #[validate(length(min = 1, max = 1000, message = "Comment must be 1-1000 characters"))]
    pub comment: String,

    #[serde(default)]
    #[validate(range(min = 0, message = "Tip must not be negative"))]
    pub tip: i64,
}
