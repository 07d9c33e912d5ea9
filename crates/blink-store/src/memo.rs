//! Memoization on top of the store.
//!
//! A memoized key is an ordinary entry: it shows up in `all`, can be
//! forgotten, flushed or overwritten like any other. Memo keys are literal;
//! a `*` in the key is stored as-is and never resolved as a wildcard.
//!
//! Producers run with no store lock held, so they may read, write and
//! memoize through the same store. A per-key claim keeps concurrent callers
//! of `once` for the same key waiting while one of them produces, which
//! makes the producer run at most once per key. A thread that re-enters
//! its own claim (a producer memoizing its own key) is not made to wait.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use blink_types::Value;
use tracing::trace;

use crate::store::Store;

/// Keys whose producer is currently running, and on which thread.
#[derive(Debug, Default)]
pub(crate) struct InFlight {
    claims: Mutex<HashMap<String, ThreadId>>,
    released: Condvar,
}

enum Claim<'a> {
    /// This call owns the key until the guard drops.
    Owner(ClaimGuard<'a>),
    /// The calling thread already owns the key further up its stack.
    Reentrant,
    /// Another thread held the key and has released it; look again.
    Released,
}

/// Releases a claim on drop, including during unwinding.
struct ClaimGuard<'a> {
    inflight: &'a InFlight,
    key: String,
}

impl InFlight {
    fn lock(&self) -> MutexGuard<'_, HashMap<String, ThreadId>> {
        self.claims.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn claim(&self, key: &str) -> Claim<'_> {
        let me = thread::current().id();
        let mut claims = self.lock();
        let holder = claims.get(key).copied();
        match holder {
            None => {
                claims.insert(key.to_string(), me);
                Claim::Owner(ClaimGuard {
                    inflight: self,
                    key: key.to_string(),
                })
            }
            Some(owner) if owner == me => Claim::Reentrant,
            Some(_) => {
                while claims.contains_key(key) {
                    claims = self
                        .released
                        .wait(claims)
                        .unwrap_or_else(PoisonError::into_inner);
                }
                Claim::Released
            }
        }
    }
}

impl Drop for ClaimGuard<'_> {
    fn drop(&mut self) {
        self.inflight.lock().remove(&self.key);
        self.inflight.released.notify_all();
    }
}

impl Store {
    /// Return the cached value at `key`, or run `producer`, cache its result
    /// and return it.
    ///
    /// ```
    /// use blink_store::Store;
    ///
    /// let store = Store::new();
    /// let first = store.once("answer", || 42);
    /// let again = store.once("answer", || 0);
    /// assert_eq!(first, again);
    /// ```
    pub fn once<F, V>(&self, key: &str, producer: F) -> Value
    where
        F: FnOnce() -> V,
        V: Into<Value>,
    {
        match self.memoize(key, || Ok::<_, Infallible>(producer())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// With `refresh` set, always run `producer` and overwrite the cached
    /// value. Otherwise identical to [`Store::once`].
    pub fn once_if<F, V>(&self, refresh: bool, key: &str, producer: F) -> Value
    where
        F: FnOnce() -> V,
        V: Into<Value>,
    {
        if !refresh {
            return self.once(key, producer);
        }
        trace!(store = ?self.label(), key, "memo refresh");
        let value = producer().into();
        self.write().insert(key.to_string(), value.clone());
        value
    }

    /// [`Store::once`] for fallible producers. An `Err` is returned to the
    /// caller and nothing is cached, so the next call tries again.
    pub fn try_once<F, V, E>(&self, key: &str, producer: F) -> Result<Value, E>
    where
        F: FnOnce() -> Result<V, E>,
        V: Into<Value>,
    {
        self.memoize(key, producer)
    }

    /// Memoize only when `enabled`. When disabled, `producer` runs and its
    /// result is returned without reading or writing the cache.
    pub fn memoize_if<F, V>(&self, enabled: bool, key: &str, producer: F) -> Value
    where
        F: FnOnce() -> V,
        V: Into<Value>,
    {
        if enabled {
            self.once(key, producer)
        } else {
            producer().into()
        }
    }

    fn memoize<F, V, E>(&self, key: &str, producer: F) -> Result<Value, E>
    where
        F: FnOnce() -> Result<V, E>,
        V: Into<Value>,
    {
        loop {
            if let Some(cached) = self.get_key(key) {
                trace!(store = ?self.label(), key, "memo hit");
                return Ok(cached);
            }
            let guard = match self.inflight.claim(key) {
                Claim::Owner(guard) => Some(guard),
                Claim::Reentrant => None,
                Claim::Released => continue,
            };
            // Someone may have filled the key between the lookup and the claim.
            if let Some(cached) = self.get_key(key) {
                return Ok(cached);
            }
            trace!(store = ?self.label(), key, "memo miss");
            let value = producer()?.into();
            let stored = self
                .write()
                .entry(key.to_string())
                .or_insert(value)
                .clone();
            drop(guard);
            return Ok(stored);
        }
    }
}
