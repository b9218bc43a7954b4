//! Data transfer objects for requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for inputs from the serving layer
//! - Response DTOs for serializing score reads

pub mod requests;
pub mod responses;

pub use requests::{
    CreateLivestreamRequest, PostCommentRequest, PostReactionRequest, RegisterUserRequest,
};
pub use responses::{
    LivestreamStatisticsResponse, PaymentResultResponse, ScoreResponse, UserStatisticsResponse,
};
