//! Unified error type for `BudgetKeeper`.
//!
//! Validation failures are raised before the store is touched. Store failures
//! carry the underlying message and are never retried here.

use rust_decimal::Decimal;
use thiserror::Error;

/// Every failure surfaced by the library.
#[derive(Debug, Error)]
pub enum Error {
    /// A referenced user, budget or expense does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record that was looked up (e.g. `"budget"`)
        entity: &'static str,
        /// Key used for the lookup
        id: String,
    },

    /// A required field was blank or otherwise malformed
    #[error("Invalid {field}: {message}")]
    InvalidInput {
        /// Name of the offending field
        field: &'static str,
        /// Human-readable explanation
        message: String,
    },

    /// A monetary value that is out of range or finer than a cent
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
    },

    /// Planned amount would drop below what has already been spent
    #[error("Planned amount {planned} is below the amount already spent ({spent})")]
    PlannedBelowSpent {
        /// Requested planned amount
        planned: Decimal,
        /// Current spent amount
        spent: Decimal,
    },

    /// A uniqueness rule was violated (e.g. email already registered)
    #[error("Conflict: {message}")]
    Conflict {
        /// Human-readable explanation
        message: String,
    },

    /// Unknown email or wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Underlying store I/O or query failure
    #[error("Store failure: {message}")]
    StoreFailure {
        /// Message reported by the store
        message: String,
    },

    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable explanation
        message: String,
    },

    /// Password hashing or hash parsing failed
    #[error("Password hashing error: {message}")]
    PasswordHash {
        /// Message reported by the hasher
        message: String,
    },
}

impl From<sea_orm::DbErr> for Error {
    fn from(value: sea_orm::DbErr) -> Self {
        Self::StoreFailure {
            message: value.to_string(),
        }
    }
}

impl Error {
    /// Shorthand for a [`Error::NotFound`] keyed by a numeric id.
    pub(crate) fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Shorthand for a [`Error::InvalidInput`].
    pub(crate) fn invalid_input(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_messages_are_human_readable() {
        assert_eq!(
            Error::not_found("budget", 42).to_string(),
            "budget not found: 42"
        );
        assert_eq!(
            Error::InvalidAmount { amount: dec!(-5) }.to_string(),
            "Invalid amount: -5"
        );
        assert_eq!(
            Error::invalid_input("name", "cannot be empty").to_string(),
            "Invalid name: cannot be empty"
        );
    }

    #[test]
    fn test_db_error_maps_to_store_failure() {
        let err: Error = sea_orm::DbErr::Custom("disk full".to_string()).into();
        assert!(matches!(err, Error::StoreFailure { ref message } if message.contains("disk full")));
    }
}
