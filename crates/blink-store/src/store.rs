//! The blink store.
//!
//! [`Store`] keeps every entry in one insertion-ordered map behind a single
//! `RwLock`. Read-only queries share the read lock; anything that mutates,
//! or reads and then writes, holds the write lock for the whole operation.
//! Memo producers are the exception: they run unlocked (see [`crate::memo`]).

use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use blink_types::Value;
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::lookup::Lookup;
use crate::memo::InFlight;
use crate::pattern::Pattern;

/// Insertion-ordered key/value pairs, as returned by `all` and wildcard
/// lookups.
pub type Entries = IndexMap<String, Value>;

/// Ephemeral in-memory key/value store.
///
/// Entries keep the position of their first insertion: overwriting a key
/// changes its value in place, a new key is appended, and removals never
/// reorder the survivors. Nothing expires on its own.
///
/// Lookups, `has`, `forget` and `pull` accept [patterns](crate::pattern).
/// The prefix helpers (`all_starting_with`, `flush_starting_with`) compare
/// literally and never treat `*` specially.
pub struct Store {
    entries: RwLock<Entries>,
    pub(crate) inflight: InFlight,
    label: Option<String>,
}

impl Store {
    /// Create an empty store with the default configuration.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            entries: RwLock::new(IndexMap::with_capacity(config.initial_capacity)),
            inflight: InFlight::default(),
            label: config.label,
        }
    }

    /// The scope label from the store's configuration.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    // No user code runs between the halves of a mutation, so a poisoned map
    // is still consistent.
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Entries> {
        self.entries.read().unwrap_or_else(|poisoned| {
            warn!(store = ?self.label, "recovering poisoned store lock");
            self.entries.clear_poison();
            poisoned.into_inner()
        })
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Entries> {
        self.entries.write().unwrap_or_else(|poisoned| {
            warn!(store = ?self.label, "recovering poisoned store lock");
            self.entries.clear_poison();
            poisoned.into_inner()
        })
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Insert or overwrite a single entry. Returns the store for chaining.
    ///
    /// ```
    /// use blink_store::Store;
    ///
    /// let store = Store::new();
    /// store.put("a", 1).put("b", 2).put("a", 3);
    /// let keys: Vec<String> = store.keys();
    /// assert_eq!(keys, vec!["a", "b"]);
    /// ```
    pub fn put(&self, key: impl Into<String>, value: impl Into<Value>) -> &Self {
        self.write().insert(key.into(), value.into());
        self
    }

    /// Apply `put` for every pair, in iteration order, under one lock.
    pub fn put_many<I, K, V>(&self, items: I) -> &Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut entries = self.write();
        for (key, value) in items {
            entries.insert(key.into(), value.into());
        }
        drop(entries);
        self
    }

    // -----------------------------------------------------------------------
    // Pattern queries
    // -----------------------------------------------------------------------

    /// Look up a pattern.
    ///
    /// Exact: the stored value, or `None`. Wildcard: every matching entry in
    /// insertion order, or `None` when nothing matches.
    pub fn get(&self, pattern: &str) -> Option<Lookup> {
        let pattern = Pattern::parse(pattern);
        let entries = self.read();
        lookup(&entries, &pattern)
    }

    /// Like [`Store::get`], falling back to `default` when nothing is found.
    pub fn get_or(&self, pattern: &str, default: impl Into<Value>) -> Lookup {
        self.get(pattern)
            .unwrap_or_else(|| Lookup::Value(default.into()))
    }

    /// Literal single-key lookup. `*` in `key` has no special meaning.
    pub fn get_key(&self, key: &str) -> Option<Value> {
        self.read().get(key).cloned()
    }

    /// Whether the pattern matches at least one stored key.
    pub fn has(&self, pattern: &str) -> bool {
        let pattern = Pattern::parse(pattern);
        let entries = self.read();
        match &pattern {
            Pattern::Exact(key) => entries.contains_key(key),
            Pattern::Wildcard { .. } => entries.keys().any(|k| pattern.matches(k)),
        }
    }

    /// Literal key presence test.
    pub fn contains_key(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    /// Remove every entry the pattern matches. Returns how many were removed.
    pub fn forget(&self, pattern: &str) -> usize {
        let pattern = Pattern::parse(pattern);
        let mut entries = self.write();
        let removed = match &pattern {
            Pattern::Exact(key) => usize::from(entries.shift_remove(key).is_some()),
            Pattern::Wildcard { .. } => {
                let before = entries.len();
                entries.retain(|k, _| !pattern.matches(k));
                before - entries.len()
            }
        };
        if pattern.is_wildcard() {
            debug!(store = ?self.label, %pattern, removed, "forget");
        }
        removed
    }

    /// Get and forget in one step.
    ///
    /// The entries returned are exactly the entries removed; both come from a
    /// single resolution of the pattern under the write lock.
    pub fn pull(&self, pattern: &str) -> Option<Lookup> {
        let pattern = Pattern::parse(pattern);
        let mut entries = self.write();
        let taken = match &pattern {
            Pattern::Exact(key) => entries.shift_remove(key).map(Lookup::Value),
            Pattern::Wildcard { .. } => {
                let (taken, kept): (Entries, Entries) = std::mem::take(&mut *entries)
                    .into_iter()
                    .partition(|(k, _)| pattern.matches(k));
                *entries = kept;
                debug!(store = ?self.label, %pattern, removed = taken.len(), "pull");
                (!taken.is_empty()).then_some(Lookup::Matches(taken))
            }
        };
        taken
    }

    /// Like [`Store::pull`], falling back to `default` when nothing is found.
    pub fn pull_or(&self, pattern: &str, default: impl Into<Value>) -> Lookup {
        self.pull(pattern)
            .unwrap_or_else(|| Lookup::Value(default.into()))
    }

    // -----------------------------------------------------------------------
    // Whole-store and prefix operations
    // -----------------------------------------------------------------------

    /// Copy of every entry in insertion order.
    pub fn all(&self) -> Entries {
        self.read().clone()
    }

    /// Entries whose key begins with `prefix`, compared literally.
    /// The empty prefix selects everything.
    pub fn all_starting_with(&self, prefix: &str) -> Entries {
        self.read()
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Stored keys in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    /// Remove everything. Returns how many entries were dropped.
    pub fn flush(&self) -> usize {
        let mut entries = self.write();
        let removed = entries.len();
        entries.clear();
        debug!(store = ?self.label, removed, "flush");
        removed
    }

    /// Remove every entry whose key begins with `prefix`, compared literally.
    pub fn flush_starting_with(&self, prefix: &str) -> usize {
        let mut entries = self.write();
        let before = entries.len();
        entries.retain(|k, _| !k.starts_with(prefix));
        let removed = before - entries.len();
        debug!(store = ?self.label, prefix, removed, "flush_starting_with");
        removed
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Consume the store, returning its entries.
    pub fn into_entries(self) -> Entries {
        self.entries
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // -----------------------------------------------------------------------
    // Counters
    // -----------------------------------------------------------------------

    /// Add one to the counter at `key`.
    pub fn increment(&self, key: &str) -> StoreResult<Value> {
        self.increment_by(key, 1)
    }

    /// Add `step` to the counter at `key` and return the new value.
    ///
    /// An absent key counts from `0`. A present, non-numeric value is an
    /// error and is left untouched.
    pub fn increment_by(&self, key: &str, step: i64) -> StoreResult<Value> {
        let mut entries = self.write();
        match entries.get_mut(key) {
            Some(slot) => {
                *slot = slot
                    .checked_add(step)
                    .map_err(|e| StoreError::for_key(key, e))?;
                Ok(slot.clone())
            }
            None => {
                let value = Value::Int(step);
                entries.insert(key.to_string(), value.clone());
                Ok(value)
            }
        }
    }

    /// Subtract one from the counter at `key`.
    pub fn decrement(&self, key: &str) -> StoreResult<Value> {
        self.decrement_by(key, 1)
    }

    /// Subtract `step` from the counter at `key`. Same as
    /// `increment_by(key, -step)`.
    pub fn decrement_by(&self, key: &str, step: i64) -> StoreResult<Value> {
        let step = step.checked_neg().ok_or_else(|| StoreError::Overflow {
            key: key.to_string(),
        })?;
        self.increment_by(key, step)
    }
}

fn lookup(entries: &Entries, pattern: &Pattern) -> Option<Lookup> {
    match pattern {
        Pattern::Exact(key) => entries.get(key).cloned().map(Lookup::Value),
        Pattern::Wildcard { .. } => {
            let matched: Entries = entries
                .iter()
                .filter(|(k, _)| pattern.matches(k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            (!matched.is_empty()).then_some(Lookup::Matches(matched))
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Store {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let store = Store::new();
        store.put_many(iter);
        store
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Store {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.put_many(iter);
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("label", &self.label)
            .field("entry_count", &self.len())
            .finish()
    }
}
