//! Session-scoped persistence of floating-window layout.
//!
//! Storage is an optimization: every failure here is logged and degrades to "no prior layout".
//! Nothing in this module returns an error to its caller.

use std::rc::Rc;

use leptos::logging;
use platform_host::{Clock, SessionStorage, StorageError};

use crate::{
    config::WindowRuntimeConfig,
    model::{PersistedStore, WindowId, WindowPosition, WindowRecord},
};

/// Fields written by [`WindowStore::save_window`].
///
/// `None` for `title`, `icon`, or `origin_url` keeps whatever the existing record holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowRecordUpdate {
    /// Window to write.
    pub id: WindowId,
    /// Committed position.
    pub position: WindowPosition,
    /// Whether the window is minimized.
    pub is_minimized: bool,
    /// Current z-index.
    pub z_index: u64,
    /// Title; `None` keeps the stored one.
    pub title: Option<String>,
    /// Icon; `None` keeps the stored one.
    pub icon: Option<String>,
    /// Origin route; ignored when one is already stored.
    pub origin_url: Option<String>,
}

/// Versioned, expiring window-record store over a [`SessionStorage`] backend.
///
/// Clones share the same backend.
#[derive(Clone)]
pub struct WindowStore {
    storage: Rc<dyn SessionStorage>,
    clock: Rc<dyn Clock>,
    key: String,
    schema_version: String,
    session_timeout_ms: u64,
}

impl WindowStore {
    /// Creates a store over `storage` using the key, version and timeout from `config`.
    pub fn new(
        storage: Rc<dyn SessionStorage>,
        clock: Rc<dyn Clock>,
        config: &WindowRuntimeConfig,
    ) -> Self {
        Self {
            storage,
            clock,
            key: config.storage_key.clone(),
            schema_version: config.schema_version.clone(),
            session_timeout_ms: config.session_timeout_ms,
        }
    }

    /// Schema version this store reads and writes.
    pub fn schema_version(&self) -> &str {
        &self.schema_version
    }

    /// Reads the persisted store at session start or mount.
    ///
    /// Returns `None` when nothing is stored, or when the stored value is corrupt or from another
    /// schema version (storage is wiped in both cases). Expired records and stale minimized
    /// entries are pruned, and the cleaned copy is written back when pruning changed anything.
    pub fn load(&self) -> Option<PersistedStore> {
        let mut store = self.snapshot()?;

        let expired = store.prune_expired(self.clock.now_ms(), self.session_timeout_ms);
        let reordered = store.normalize_minimized_order();
        if expired > 0 {
            logging::log!("pruned {expired} expired window record(s)");
        }
        if expired > 0 || reordered {
            self.save(&store);
        }
        Some(store)
    }

    /// Reads the persisted store without expiring anything.
    ///
    /// Write paths go through here so a write by one window never drops the record of another
    /// window that is open but idle. Corrupt or foreign-version data is still wiped.
    pub fn snapshot(&self) -> Option<PersistedStore> {
        let raw = match self.storage.get_item(&self.key) {
            Ok(raw) => raw?,
            Err(err) => {
                logging::warn!("window store read failed: {err}");
                return None;
            }
        };

        let store = match serde_json::from_str::<PersistedStore>(&raw) {
            Ok(store) => store,
            Err(err) => {
                logging::warn!("window store is corrupt, resetting: {err}");
                self.clear_all();
                return None;
            }
        };

        if store.version != self.schema_version {
            logging::warn!(
                "window store schema `{}` does not match `{}`, resetting",
                store.version,
                self.schema_version
            );
            self.clear_all();
            return None;
        }
        Some(store)
    }

    /// Serializes and writes the whole store.
    ///
    /// A full storage medium clears the key instead of failing.
    pub fn save(&self, store: &PersistedStore) {
        let raw = match serde_json::to_string(store) {
            Ok(raw) => raw,
            Err(err) => {
                logging::warn!("window store serialize failed: {err}");
                return;
            }
        };

        match self.storage.set_item(&self.key, &raw) {
            Ok(()) => {}
            Err(StorageError::QuotaExceeded) => {
                logging::warn!("window store quota exceeded, clearing persisted layout");
                self.clear_all();
            }
            Err(err) => logging::warn!("window store write failed: {err}"),
        }
    }

    /// Returns the stored record for `id`, expired or not.
    pub fn record(&self, id: &WindowId) -> Option<WindowRecord> {
        self.snapshot()?.windows.remove(id)
    }

    /// Returns the record for `id` only if it has not expired. Other records are left alone.
    pub fn live_record(&self, id: &WindowId) -> Option<WindowRecord> {
        self.record(id)
            .filter(|record| !record.is_expired(self.clock.now_ms(), self.session_timeout_ms))
    }

    /// Upserts one record and refreshes its `last_touched` stamp.
    ///
    /// The minimized list follows the record's flag in the same write.
    pub fn save_window(&self, update: WindowRecordUpdate) {
        let mut store = self.snapshot_or_empty();
        let now = self.clock.now_ms();
        let previous = store.windows.remove(&update.id);

        let record = WindowRecord {
            id: update.id.clone(),
            position: update.position,
            z_index: update.z_index,
            // Flag is applied through `set_minimized` below so the order list stays in sync.
            is_minimized: previous.as_ref().map(|p| p.is_minimized).unwrap_or(false),
            title: update
                .title
                .or_else(|| previous.as_ref().map(|p| p.title.clone()))
                .unwrap_or_default(),
            icon: update
                .icon
                .or_else(|| previous.as_ref().and_then(|p| p.icon.clone())),
            origin_url: previous
                .as_ref()
                .and_then(|p| p.origin_url.clone())
                .or(update.origin_url),
            last_touched: now,
        };
        store.windows.insert(update.id.clone(), record);
        store.set_minimized(&update.id, update.is_minimized);
        self.save(&store);
    }

    /// Moves `id` to the front of the minimized list, or removes it on restore.
    pub fn update_minimized_order(&self, id: &WindowId, is_minimized: bool) {
        let Some(mut store) = self.snapshot() else {
            return;
        };
        if store.set_minimized(id, is_minimized) {
            if let Some(record) = store.windows.get_mut(id) {
                record.last_touched = self.clock.now_ms();
            }
            self.save(&store);
        }
    }

    /// Deletes the record for `id` and its minimized entry.
    pub fn remove_window(&self, id: &WindowId) {
        let Some(mut store) = self.snapshot() else {
            return;
        };
        if store.remove(id) {
            self.save(&store);
        }
    }

    /// Wipes the persisted store.
    pub fn clear_all(&self) {
        if let Err(err) = self.storage.remove_item(&self.key) {
            logging::warn!("window store clear failed: {err}");
        }
    }

    fn snapshot_or_empty(&self) -> PersistedStore {
        self.snapshot()
            .unwrap_or_else(|| PersistedStore::empty(self.schema_version.clone()))
    }
}
