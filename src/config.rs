//! Engine configuration.
//!
//! A small TOML-backed config struct; every field has a default so an
//! empty (or missing) file is valid.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::{Error, Result};

/// Default quiet period before a debounced write is dispatched.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Tunables for the sync engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Quiet period in milliseconds before a coalesced write fires.
    pub debounce_ms: u64,

    /// Log a warning when the teardown flush pushes unverified writes.
    pub warn_on_lossy_flush: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            warn_on_lossy_flush: true,
        }
    }
}

impl SyncConfig {
    /// The quiet period as a `Duration`.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Parse a config from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load a config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
