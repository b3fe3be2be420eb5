//! Runtime tunables for the window subsystem.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    geometry::GeometryConfig,
    model::{SESSION_TIMEOUT_MS, WINDOW_STORE_SCHEMA_VERSION},
};

/// Session storage key holding the persisted window store.
pub const WINDOW_STORE_KEY: &str = "clinical.floating_windows.v1";
/// First z-index handed out; sits above non-modal page chrome.
pub const Z_INDEX_BASE: u64 = 1000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Failures reading a [`WindowRuntimeConfig`] override.
pub enum ConfigError {
    #[error("invalid window runtime config: {0}")]
    /// The override document is not valid JSON for the config shape.
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Tunables for the window runtime. Missing fields take their defaults.
pub struct WindowRuntimeConfig {
    /// Session-storage key holding the persisted store.
    pub storage_key: String,
    /// Schema version written to, and required from, the persisted store.
    pub schema_version: String,
    /// Idle time after which a persisted record expires.
    pub session_timeout_ms: u64,
    /// Placement and clamping margins.
    pub geometry: GeometryConfig,
    /// First z-index handed out by the registry.
    pub z_index_base: u64,
    /// Pointer travel (px) before a press on the drag handle becomes a drag.
    pub drag_threshold_px: i32,
    /// Arrow-key step while a window is grabbed.
    pub keyboard_step_px: i32,
    /// Arrow-key step while Shift is held.
    pub keyboard_large_step_px: i32,
}

impl Default for WindowRuntimeConfig {
    fn default() -> Self {
        Self {
            storage_key: WINDOW_STORE_KEY.to_string(),
            schema_version: WINDOW_STORE_SCHEMA_VERSION.to_string(),
            session_timeout_ms: SESSION_TIMEOUT_MS,
            geometry: GeometryConfig::default(),
            z_index_base: Z_INDEX_BASE,
            drag_threshold_px: 3,
            keyboard_step_px: 10,
            keyboard_large_step_px: 50,
        }
    }
}

impl WindowRuntimeConfig {
    /// Parses a JSON override. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when `raw` is not a valid config document.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}
