//! Error types for Rolegate.
//!
//! This module defines the `Error` enum which represents all possible
//! errors that can occur within the role engine and its storage adapters.

use thiserror::Error;

/// The main error type for Rolegate operations.
///
/// This enum covers all error cases that can occur during role
/// resolution, inheritance-graph mutation, mapping management, and
/// storage operations.
#[derive(Debug, Error)]
pub enum Error {
    // ==================== Validation Errors ====================
    /// The call shape is malformed (e.g., a required argument is empty
    /// or of an unusable form). Raised before any I/O.
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// A scope or role argument cannot be converted to an identifier.
    #[error("Unsupported reference: {reason}")]
    UnsupportedReference { reason: String },

    // ==================== Storage Errors ====================
    /// A storage operation failed.
    #[error("Database error: {message}")]
    Database { message: String },

    /// The requested record was not found.
    #[error("Record not found: {entity} with {key}={value}")]
    NotFound {
        entity: String,
        key: String,
        value: String,
    },

    /// A unique constraint was violated (e.g., duplicate mapping).
    #[error("Duplicate entry: {entity} with {field}={value} already exists")]
    Duplicate {
        entity: String,
        field: String,
        value: String,
    },

    // ==================== Internal Errors ====================
    /// Serialization/deserialization failed.
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl Error {
    /// Creates a new validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a new unsupported-reference error.
    pub fn unsupported(reason: impl Into<String>) -> Self {
        Self::UnsupportedReference {
            reason: reason.into(),
        }
    }

    /// Creates a new database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    /// Creates a new not found error.
    pub fn not_found(
        entity: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::NotFound {
            entity: entity.into(),
            key: key.into(),
            value: value.into(),
        }
    }

    /// Creates a new duplicate entry error.
    pub fn duplicate(
        entity: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::Duplicate {
            entity: entity.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    /// Returns true if this error originates from caller input rather
    /// than from storage.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::UnsupportedReference { .. }
        )
    }
}

/// A Result type alias using Error.
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::unsupported("object without id");
        assert_eq!(err.to_string(), "Unsupported reference: object without id");
    }

    #[test]
    fn test_is_caller_error() {
        assert!(Error::validation("bad arg").is_caller_error());
        assert!(!Error::database("boom").is_caller_error());
        assert!(!Error::not_found("role", "id", "r1").is_caller_error());
    }
}
