//! Error types for store operations.

use blink_types::TypeError;

/// Errors from blink store operations.
///
/// Missing keys and wildcard queries that match nothing are not errors;
/// they surface as `None` or as the caller's default. Only caller mistakes
/// end up here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Increment or decrement applied to a value that is not a number.
    #[error("cannot do arithmetic on {key}: expected a numeric value, found {found}")]
    NotNumeric { key: String, found: &'static str },

    /// Increment or decrement would overflow the stored integer.
    #[error("integer overflow on {key}")]
    Overflow { key: String },

    /// The store configuration could not be parsed.
    #[error("config error: {0}")]
    Config(String),
}

impl StoreError {
    /// Attach the offending key to a value-level error.
    pub(crate) fn for_key(key: &str, err: TypeError) -> Self {
        match err {
            TypeError::NotNumeric { found } => StoreError::NotNumeric {
                key: key.to_string(),
                found,
            },
            TypeError::Overflow => StoreError::Overflow {
                key: key.to_string(),
            },
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
