use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Configuration for a blink store.
///
/// Every field has a default, so an empty TOML document is a valid config.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Number of entries to pre-allocate room for.
    pub initial_capacity: usize,
    /// Name of the scope the store lives in (a request ID, a job name).
    /// Shows up in `Debug` output and in tracing events.
    pub label: Option<String>,
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Parse a configuration from a TOML document.
    ///
    /// ```
    /// use blink_store::StoreConfig;
    ///
    /// let config = StoreConfig::from_toml_str("label = \"request-42\"").unwrap();
    /// assert_eq!(config.label.as_deref(), Some("request-42"));
    /// assert_eq!(config.initial_capacity, 0);
    /// ```
    pub fn from_toml_str(source: &str) -> StoreResult<Self> {
        toml::from_str(source).map_err(|e| StoreError::Config(e.to_string()))
    }
}
