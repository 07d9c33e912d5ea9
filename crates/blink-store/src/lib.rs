//! Ephemeral in-process key/value store ("blink cache").
//!
//! A [`Store`] holds transient computed values for the lifetime of one
//! process, request or job. Nothing is persisted, nothing expires, and
//! nothing is evicted; entries leave only through `forget`, `pull` or a
//! flush.
//!
//! # Queries
//!
//! Keys are plain strings. When a query contains `*` it becomes a wildcard
//! [`Pattern`]: each `*` matches any run of characters and the match spans
//! the whole key. Wildcard lookups return every matching entry in insertion
//! order as [`Lookup::Matches`].
//!
//! ```
//! use blink_store::{Lookup, Store};
//!
//! let store = Store::new();
//! store
//!     .put("user.1.name", "ada")
//!     .put("user.2.name", "grace")
//!     .put("user.1.email", "ada@example.com");
//!
//! let names = store.get("user.*.name");
//! assert_eq!(names.as_ref().map(Lookup::len), Some(2));
//! assert!(store.get("team.*").is_none());
//! ```
//!
//! # Modules
//!
//! - [`store`] -- [`Store`] and its CRUD, prefix and counter operations
//! - [`memo`] -- `once` / `once_if` memoization
//! - [`pattern`] -- Wildcard compilation and matching
//! - [`lookup`] -- The [`Lookup`] result of `get` / `pull`
//! - [`config`] -- [`StoreConfig`]
//! - [`error`] -- [`StoreError`]
//!
//! # Design Rules
//!
//! 1. Insertion order is observable and stable; overwrites keep position.
//! 2. A wildcard with no matches is "not found", never an empty map.
//! 3. Prefix helpers compare literally; only pattern queries know `*`.
//! 4. One lock guards the map; compound operations hold it throughout.

pub mod config;
pub mod error;
pub mod lookup;
pub mod memo;
pub mod pattern;
pub mod store;

pub use blink_types::{Record, TypeError, Value};
pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use lookup::Lookup;
pub use pattern::Pattern;
pub use store::{Entries, Store};
