//! Cart session configuration.

use serde::{Deserialize, Serialize};

/// Storage key the cart is persisted under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "turbo:cart";

/// How persistence writes are issued after a mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// One background writer applies snapshots in mutation order, collapsing
    /// a backlog into the newest snapshot.
    #[default]
    Queued,
    /// Every write runs as its own task; completion order is not guaranteed.
    Detached,
}

/// Configuration for a cart session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartConfig {
    /// Key of the cart's storage slot.
    pub storage_key: String,
    /// Write scheduling policy.
    pub write_mode: WriteMode,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            write_mode: WriteMode::default(),
        }
    }
}

impl CartConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the storage key.
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Set the write mode.
    pub fn with_write_mode(mut self, mode: WriteMode) -> Self {
        self.write_mode = mode;
        self
    }
}
