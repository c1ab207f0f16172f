//! Error types for the persistence layer.
//!
//! Errors are split by the phase in which they arise:
//!
//! - [`ValidationError`] - the request itself is malformed (bad field path,
//!   redundant logical node, unknown operator keyword). Raised while the
//!   request is being constructed or deserialized.
//! - [`SearchError`] - the request is well-formed but cannot be turned into
//!   SQL (unknown direct field, operator/value mismatch). Raised while the
//!   query is being built.
//! - [`BackendError`] - the database failed while executing the statement.
//!
//! The first two are client errors; the last is a server error.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// The primary error type for all search and storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Request validation errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Query construction errors
    #[error(transparent)]
    Search(#[from] SearchError),

    /// Backend-specific errors
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl StorageError {
    /// Returns true when the error was caused by the caller's input rather
    /// than by the backend.
    pub fn is_client_error(&self) -> bool {
        matches!(self, StorageError::Validation(_) | StorageError::Search(_))
    }
}

/// Errors raised while constructing or deserializing a search request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("unknown level: {level}")]
    UnknownLevel { level: String },

    #[error("invalid field path '{path}': {message}")]
    InvalidFieldPath { path: String, message: String },

    #[error("unsupported operator: {operator}")]
    UnsupportedOperator { operator: String },

    #[error("unsupported logical operator: {operator}")]
    UnsupportedLogicalOperator { operator: String },

    #[error("unsupported aggregation: {operation}")]
    UnsupportedAggregation { operation: String },

    #[error("unsupported output format: {format}")]
    UnsupportedOutputFormat { format: String },

    #[error("invalid condition on '{field}': {message}")]
    InvalidCondition { field: String, message: String },

    #[error("invalid filter: {message}")]
    InvalidFilter { message: String },

    #[error("invalid search request: {message}")]
    InvalidRequest { message: String },
}

/// Errors raised while translating a request into SQL.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    #[error("field resolution error for '{field}': {message}")]
    FieldResolution { field: String, message: String },

    #[error("condition validation error for '{field}' {operator}: {message}")]
    ConditionValidation {
        field: String,
        operator: String,
        message: String,
    },

    #[error("unsupported operator: {operator}")]
    UnsupportedOperator { operator: String },

    #[error("unsupported aggregation: {operation}")]
    UnsupportedAggregation { operation: String },
}

/// Errors originating from the database backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Connection to the backend failed.
    #[error("connection failed to {backend_name}: {message}")]
    ConnectionFailed {
        backend_name: String,
        message: String,
    },

    /// Connection pool exhausted.
    #[error("connection pool exhausted for {backend_name}")]
    PoolExhausted { backend_name: String },

    /// Internal backend error.
    #[error("internal error in {backend_name}: {message}")]
    Internal {
        backend_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Query execution error.
    #[error("query execution failed: {message}")]
    QueryError { message: String },

    /// Serialization/deserialization error.
    #[error("serialization error: {message}")]
    SerializationError { message: String },
}

/// Result type alias for storage and search operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::InvalidFieldPath {
            path: "compounds.foo.bar".to_string(),
            message: "middle segment must be 'details'".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid field path 'compounds.foo.bar': middle segment must be 'details'"
        );
    }

    #[test]
    fn test_search_error_display() {
        let err = SearchError::ConditionValidation {
            field: "compounds.details.mw".to_string(),
            operator: "RANGE".to_string(),
            message: "RANGE operator requires first value to be less than second value"
                .to_string(),
        };
        assert!(err.to_string().starts_with("condition validation error"));
        assert!(err.to_string().contains("RANGE"));
    }

    #[test]
    fn test_client_error_classification() {
        let err: StorageError = SearchError::UnsupportedOperator {
            operator: "MATCHES".to_string(),
        }
        .into();
        assert!(err.is_client_error());

        let err: StorageError = ValidationError::InvalidFilter {
            message: "redundant".to_string(),
        }
        .into();
        assert!(err.is_client_error());

        let err: StorageError = BackendError::QueryError {
            message: "syntax error".to_string(),
        }
        .into();
        assert!(!err.is_client_error());
    }
}
