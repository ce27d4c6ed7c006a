//! Error types for tessera-core.
//!
//! Everything here is a programmer or data error: nothing is retried and
//! nothing is recovered internally. Lookups that simply find nothing do not
//! error at all; they return an empty/orphaned value instead.

use crate::value::ValueType;
use thiserror::Error;

/// Result type for tessera operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for tessera operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A span was constructed with `start > end`.
    #[error("Invalid span: start {start} > end {end}")]
    InvalidSpan {
        /// Requested start offset
        start: usize,
        /// Requested end offset
        end: usize,
    },

    /// Two text fragments from different (or no) documents were combined.
    #[error("Cross-document operation: {0}")]
    CrossDocumentOperation(String),

    /// A type name was redefined with a different value type, parent or tag.
    #[error("Conflicting type definition: {0}")]
    ConflictingTypeDefinition(String),

    /// A type name could not be resolved in any category.
    #[error("Unknown type name: {0}")]
    UnknownTypeName(String),

    /// A value could not be coerced to an attribute's declared value type.
    #[error("Invalid {value_type} value: {reason}")]
    InvalidValue {
        /// The declared value type
        value_type: ValueType,
        /// Why coercion failed
        reason: String,
    },

    /// An offset lies outside the text it refers to.
    #[error("Out of bounds: {0}")]
    OutOfBounds(String),

    /// Malformed configuration or wire data.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// JSON (de)serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a cross-document operation error.
    #[must_use]
    pub fn cross_document(msg: impl Into<String>) -> Self {
        Self::CrossDocumentOperation(msg.into())
    }

    /// Create a conflicting type definition error.
    #[must_use]
    pub fn conflicting(msg: impl Into<String>) -> Self {
        Self::ConflictingTypeDefinition(msg.into())
    }

    /// Create an unknown type name error.
    #[must_use]
    pub fn unknown_type(name: impl Into<String>) -> Self {
        Self::UnknownTypeName(name.into())
    }

    /// Create an invalid value error.
    #[must_use]
    pub fn invalid_value(value_type: ValueType, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            value_type,
            reason: reason.into(),
        }
    }

    /// Create an out-of-bounds error.
    #[must_use]
    pub fn out_of_bounds(msg: impl Into<String>) -> Self {
        Self::OutOfBounds(msg.into())
    }

    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
