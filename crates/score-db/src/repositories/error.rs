//! Error handling utilities for repositories

use score_core::error::DomainError;
use sqlx::Error as SqlxError;

/// lock_not_available: `lock_timeout` expired
const LOCK_NOT_AVAILABLE: &str = "55P03";
/// serialization_failure
const SERIALIZATION_FAILURE: &str = "40001";
/// deadlock_detected
const DEADLOCK_DETECTED: &str = "40P01";
/// numeric_value_out_of_range
const NUMERIC_OUT_OF_RANGE: &str = "22003";

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    if is_contention(&e) {
        return DomainError::TransientContention(e.to_string());
    }
    DomainError::DatabaseError(e.to_string())
}

/// Check for unique violation and return appropriate error or fallback
pub fn map_unique_violation<F>(e: SqlxError, on_unique: F) -> DomainError
where
    F: FnOnce() -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return on_unique();
        }
    }
    map_db_error(e)
}

/// Check for foreign key violation and return appropriate error or fallback
pub fn map_foreign_key_violation<F>(e: SqlxError, on_fk: F) -> DomainError
where
    F: FnOnce() -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_foreign_key_violation() {
            return on_fk();
        }
    }
    map_db_error(e)
}

/// BIGINT arithmetic or cast overflow
pub fn is_out_of_range(e: &SqlxError) -> bool {
    e.as_database_error()
        .and_then(|db_err| db_err.code())
        .is_some_and(|code| code == NUMERIC_OUT_OF_RANGE)
}

/// Lock wait timeout, serialization failure, or deadlock
fn is_contention(e: &SqlxError) -> bool {
    e.as_database_error()
        .and_then(|db_err| db_err.code())
        .is_some_and(|code| {
            matches!(
                code.as_ref(),
                LOCK_NOT_AVAILABLE | SERIALIZATION_FAILURE | DEADLOCK_DETECTED
            )
        })
}
