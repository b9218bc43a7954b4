//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::{LivestreamId, UserId};

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("User not found: {0}")]
    UserNameNotFound(String),

    #[error("Livestream not found: {0}")]
    LivestreamNotFound(LivestreamId),

    /// The user exists but its score row does not: a broken invariant,
    /// never a recoverable case
    #[error("Score row missing for user {0}")]
    ScoreRowMissing(UserId),

    #[error("Score row missing for livestream {0}")]
    LivestreamScoreRowMissing(LivestreamId),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Tip must not be negative: {0}")]
    NegativeTip(i64),

    #[error("Score counters can only grow")]
    NonMonotonicDelta,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("User already exists: {0}")]
    UserAlreadyExists(String),

    // =========================================================================
    // Contention Errors
    // =========================================================================
    /// Lock wait timed out or the transaction lost a serialization race.
    /// Safe to retry the whole operation.
    #[error("Transient contention: {0}")]
    TransientContention(String),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Score counter overflow for user {0}")]
    ScoreOverflow(UserId),

    #[error("Score counter overflow for livestream {0}")]
    LivestreamScoreOverflow(LivestreamId),

    /// Sum of tips over all users does not fit in an i64
    #[error("Total tip overflow")]
    TotalTipOverflow,

    #[error("Injected fault at {0}")]
    InjectedFault(&'static str),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::UserNotFound(_) | Self::UserNameNotFound(_) => "UNKNOWN_USER",
            Self::LivestreamNotFound(_) => "UNKNOWN_LIVESTREAM",
            Self::ScoreRowMissing(_) | Self::LivestreamScoreRowMissing(_) => "SCORE_ROW_MISSING",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::NegativeTip(_) => "NEGATIVE_TIP",
            Self::NonMonotonicDelta => "NON_MONOTONIC_DELTA",

            // Conflict
            Self::UserAlreadyExists(_) => "USER_ALREADY_EXISTS",

            // Contention
            Self::TransientContention(_) => "TRANSIENT_CONTENTION",

            // Infrastructure
            Self::ScoreOverflow(_) | Self::LivestreamScoreOverflow(_) => "SCORE_OVERFLOW",
            Self::TotalTipOverflow => "TOTAL_TIP_OVERFLOW",
            Self::InjectedFault(_) => "INJECTED_FAULT",
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_)
                | Self::UserNameNotFound(_)
                | Self::LivestreamNotFound(_)
                | Self::ScoreRowMissing(_)
                | Self::LivestreamScoreRowMissing(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_) | Self::NegativeTip(_) | Self::NonMonotonicDelta
        )
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::UserAlreadyExists(_))
    }

    /// Check if retrying the whole operation may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientContention(_))
    }

    /// Check if this error signals corrupted derived state
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Self::ScoreRowMissing(_)
                | Self::LivestreamScoreRowMissing(_)
                | Self::ScoreOverflow(_)
                | Self::LivestreamScoreOverflow(_)
                | Self::TotalTipOverflow
        )
    }
}
