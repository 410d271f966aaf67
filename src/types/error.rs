//! Error types for the aggregation engine
//!
//! This module defines all error types that can occur while aggregating
//! transactions into the backing store.
//!
//! # Error Categories
//!
//! - **Store Errors**: the store cannot be reached, a constraint rejected a write,
//!   or a statement failed / returned an unexpected result
//! - **Input Errors**: invalid amounts, malformed CSV records, I/O failures
//! - **Arithmetic Errors**: overflow while computing a balance
//! - **Configuration Errors**: out-of-range settings

use rusqlite::ErrorCode;
use thiserror::Error;

/// Main error type for the aggregation engine
///
/// Only `StoreUnavailable` is fatal to a whole run. Every other variant is
/// scoped to the transaction that triggered it; the engine rolls that
/// transaction back and the caller decides whether to retry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AggregationError {
    /// The backing store could not be opened or reached
    #[error("Store unavailable: {message}")]
    StoreUnavailable {
        /// Description of the connection failure
        message: String,
    },

    /// A uniqueness or other constraint rejected a write
    ///
    /// Raised when two writers race to seed the same (group, date) balance row.
    #[error("Constraint violation: {message}")]
    ConstraintViolation {
        /// Description of the violated constraint
        message: String,
    },

    /// A statement failed, or returned nothing where a value was required
    #[error("Query failure: {message}")]
    QueryFailure {
        /// Description of the failure
        message: String,
    },

    /// Amount is negative, too precise for fixed-point storage, or out of range
    #[error("Invalid amount '{amount}' for transaction {tx}")]
    InvalidAmount {
        /// The rejected amount, as written
        amount: String,
        /// Transaction ID
        tx: i64,
    },

    /// Aggregate arithmetic would overflow
    ///
    /// Raised in Rust for seeded balances, and by the store when a running
    /// total no longer fits an integer column.
    #[error("Arithmetic overflow in {operation}{}", group.map(|g| format!(" for group {}", g)).unwrap_or_default())]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Group whose aggregate was being updated (if known)
        group: Option<i64>,
    },

    /// A configuration value is out of range
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the problem
        message: String,
    },

    /// I/O error while reading input or writing reports
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    Parse {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },
}

impl AggregationError {
    /// Whether this error should abort a whole run rather than one transaction
    pub fn is_fatal(&self) -> bool {
        matches!(self, AggregationError::StoreUnavailable { .. })
    }

    /// Create a StoreUnavailable error
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        AggregationError::StoreUnavailable {
            message: message.into(),
        }
    }

    /// Create a ConstraintViolation error
    pub fn constraint_violation(message: impl Into<String>) -> Self {
        AggregationError::ConstraintViolation {
            message: message.into(),
        }
    }

    /// Create a QueryFailure error
    pub fn query_failure(message: impl Into<String>) -> Self {
        AggregationError::QueryFailure {
            message: message.into(),
        }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: impl ToString, tx: i64) -> Self {
        AggregationError::InvalidAmount {
            amount: amount.to_string(),
            tx,
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, group: i64) -> Self {
        AggregationError::ArithmeticOverflow {
            operation: operation.to_string(),
            group: Some(group),
        }
    }

    /// Attach `group` to an overflow reported by the store without one
    pub fn for_group(self, group: i64) -> Self {
        match self {
            AggregationError::ArithmeticOverflow {
                operation,
                group: None,
            } => AggregationError::ArithmeticOverflow {
                operation,
                group: Some(group),
            },
            other => other,
        }
    }

    /// Create an InvalidConfig error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        AggregationError::InvalidConfig {
            message: message.into(),
        }
    }
}

// SQLITE_CONSTRAINT | (12 << 8): a STRICT column rejected a value of the
// wrong type, which for our integer columns means an overflowed sum
const SQLITE_CONSTRAINT_DATATYPE: i32 = 3091;

// Message of the error SUM() raises on integer overflow
const SUM_OVERFLOW_MESSAGE: &str = "integer overflow";

// Classify SQLite failures into the store taxonomy
impl From<rusqlite::Error> for AggregationError {
    fn from(error: rusqlite::Error) -> Self {
        match &error {
            rusqlite::Error::SqliteFailure(failure, _)
                if failure.extended_code == SQLITE_CONSTRAINT_DATATYPE =>
            {
                AggregationError::ArithmeticOverflow {
                    operation: format!("store update ({error})"),
                    group: None,
                }
            }
            rusqlite::Error::SqliteFailure(_, Some(message)) if message == SUM_OVERFLOW_MESSAGE => {
                AggregationError::ArithmeticOverflow {
                    operation: "store sum".to_string(),
                    group: None,
                }
            }
            rusqlite::Error::SqliteFailure(failure, _) => match failure.code {
                ErrorCode::ConstraintViolation => {
                    AggregationError::constraint_violation(error.to_string())
                }
                ErrorCode::CannotOpen
                | ErrorCode::NotADatabase
                | ErrorCode::PermissionDenied
                | ErrorCode::DatabaseCorrupt
                | ErrorCode::SystemIoFailure => {
                    AggregationError::store_unavailable(error.to_string())
                }
                _ => AggregationError::query_failure(error.to_string()),
            },
            _ => AggregationError::query_failure(error.to_string()),
        }
    }
}

impl From<std::io::Error> for AggregationError {
    fn from(error: std::io::Error) -> Self {
        AggregationError::Io {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for AggregationError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        AggregationError::Parse {
            line,
            message: error.to_string(),
        }
    }
}
