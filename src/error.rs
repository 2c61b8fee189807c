//! Error types for sqlcap.
//!
//! Driver errors pass through untouched in [`DbError::Driver`]; the other
//! variants are produced by this crate itself (context expiry, closed
//! transactions, capability mismatches and setup failures).

use crate::capability::Capability;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    /// Error reported by the underlying sqlx driver, verbatim.
    #[error(transparent)]
    Driver(#[from] sqlx::Error),

    #[error("context canceled")]
    Canceled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,

    /// The transaction was already committed or rolled back.
    #[error("transaction has already been committed or rolled back")]
    TxClosed,

    #[error("database handle does not support {capability}")]
    Unsupported { capability: Capability },

    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

impl DbError {
    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a capability mismatch error.
    pub fn unsupported(capability: Capability) -> Self {
        Self::Unsupported { capability }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connection { suggestion, .. } => Some(suggestion),
            _ => None,
        }
    }

    /// Check if this error came from a cancelled or expired context.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Canceled | Self::DeadlineExceeded)
    }
}

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;
