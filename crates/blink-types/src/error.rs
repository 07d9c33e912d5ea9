use thiserror::Error;

/// Errors produced by value operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("expected a numeric value, found {found}")]
    NotNumeric { found: &'static str },

    #[error("integer overflow")]
    Overflow,
}
