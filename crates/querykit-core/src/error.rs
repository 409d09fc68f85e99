//! Core error types for the querykit framework.
//!
//! This module provides the [`QueryError`] enum covering lookup resolution,
//! value preparation, validation, and configuration failures, plus the
//! [`ValidationError`] struct used by the field layer.
//!
//! Note that "this predicate matches no rows" is deliberately *not* an error:
//! the WHERE-clause compiler models it as a distinguished result variant so
//! the expected, frequent short-circuit outcome never travels down the error
//! path.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// A validation failure reported by the field layer.
///
/// Carries a message and a short machine-readable code (e.g.
/// `"invalid_range_format"`), mirroring the error message catalogs of the
/// field classes.
///
/// # Examples
///
/// ```
/// use querykit_core::error::ValidationError;
///
/// let err = ValidationError::new("'xxxx' value has to be a valid range format", "invalid_range_format");
/// assert_eq!(err.code, "invalid_range_format");
/// ```
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The primary error message.
    pub message: String,
    /// A short code identifying the type of validation failure.
    pub code: String,
    /// Additional parameters providing context for the error message.
    pub params: HashMap<String, String>,
}

impl ValidationError {
    /// Creates a new `ValidationError` with a message and code.
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            params: HashMap::new(),
        }
    }

    /// Adds a parameter to this validation error.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// The primary error type for querykit.
///
/// Everything here is terminal for the current query-construction call; the
/// one "expected" outcome, an empty result set, is a result variant on the
/// compiler side rather than an error.
#[derive(Error, Debug)]
pub enum QueryError {
    /// A referenced row or related object does not exist. During value
    /// normalization this is converted into the matches-nothing outcome.
    #[error("Object does not exist: {0}")]
    DoesNotExist(String),

    /// The operator name is not registered for the field, nor in the base
    /// registry. A configuration/programmer error, never retried.
    #[error("Unsupported lookup '{lookup}' for field '{field}'")]
    UnsupportedLookup {
        /// The field the lookup was attempted on.
        field: String,
        /// The unknown operator name.
        lookup: String,
    },

    /// The right-hand side value has the wrong shape for the lookup (e.g. a
    /// scalar where `range` expects two bounds).
    #[error("Invalid value for lookup '{lookup}': {reason}")]
    InvalidLookupValue {
        /// The operator name.
        lookup: String,
        /// What was wrong with the value.
        reason: String,
    },

    /// The backend has no way to express the requested operation.
    #[error("Not supported on this backend: {0}")]
    NotSupported(String),

    /// A generic database-layer error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// A user-supplied value failed validation in the field layer.
    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationError),

    /// The framework is improperly configured.
    #[error("Improperly configured: {0}")]
    ImproperlyConfigured(String),
}

/// A convenience type alias for `Result<T, QueryError>`.
pub type QueryResult<T> = Result<T, QueryError>;
