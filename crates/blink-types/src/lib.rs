//! Value model for the blink cache.
//!
//! A blink store holds opaque values for the lifetime of a process or a
//! request. This crate defines what such a value can be, and the one piece of
//! interpretation the store ever applies to a value: numeric addition for
//! counters.
//!
//! # Key Types
//!
//! - [`Value`] -- Closed sum type over scalars, blobs, lists and records
//! - [`Record`] -- Insertion-ordered string-keyed record
//! - [`TypeError`] -- Failure of a value-level operation

pub mod error;
pub mod value;

pub use error::TypeError;
pub use value::{Record, Value};
