//! Window identity, layout records, and the persisted store document.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

/// Schema version written into every persisted window store.
pub const WINDOW_STORE_SCHEMA_VERSION: &str = "1";
/// Records untouched for longer than this are dropped at load time.
pub const SESSION_TIMEOUT_MS: u64 = 60 * 60 * 1000;
/// Default window width in pixels.
pub const DEFAULT_WINDOW_WIDTH: i32 = 420;
/// Default window height in pixels.
pub const DEFAULT_WINDOW_HEIGHT: i32 = 300;

/// Caller-supplied window identity. Must be unique among open windows.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub String);

impl WindowId {
    /// Wraps a caller-supplied id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrows the id as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WindowId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for WindowId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Top-left screen coordinate in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WindowPosition {
    /// Left edge in pixels.
    pub x: i32,
    /// Top edge in pixels.
    pub y: i32,
}

impl WindowPosition {
    /// Creates a position.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns this position moved by `dx`, `dy`.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Window size in pixels.
pub struct WindowSize {
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl WindowSize {
    /// Creates a size.
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

impl Default for WindowSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_WINDOW_WIDTH,
            height: DEFAULT_WINDOW_HEIGHT,
        }
    }
}

/// Persisted geometry and ordering for one window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowRecord {
    /// Window id, also the map key.
    pub id: WindowId,
    /// Last committed top-left position.
    pub position: WindowPosition,
    /// Z-index at the last write.
    pub z_index: u64,
    /// Whether the window was minimized.
    pub is_minimized: bool,
    /// Title shown in the window and the minimized tray.
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional icon name.
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Route that first opened the window. Never overwritten once set.
    pub origin_url: Option<String>,
    /// Unix milliseconds of the last write.
    pub last_touched: u64,
}

impl WindowRecord {
    /// Whether the record has been idle for longer than `timeout_ms`.
    pub fn is_expired(&self, now_ms: u64, timeout_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_touched) > timeout_ms
    }
}

/// The whole session-scoped window layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedStore {
    /// Schema version of this document.
    pub version: String,
    #[serde(default)]
    /// Records keyed by window id.
    pub windows: BTreeMap<WindowId, WindowRecord>,
    /// Minimized window ids, most recently minimized first.
    #[serde(default)]
    pub minimized_order: Vec<WindowId>,
}

impl PersistedStore {
    /// Creates an empty store for `version`.
    pub fn empty(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            windows: BTreeMap::new(),
            minimized_order: Vec::new(),
        }
    }

    /// Drops records older than `timeout_ms`. Returns how many were removed.
    pub fn prune_expired(&mut self, now_ms: u64, timeout_ms: u64) -> usize {
        let before = self.windows.len();
        self.windows
            .retain(|_, record| !record.is_expired(now_ms, timeout_ms));
        before - self.windows.len()
    }

    /// Moves `id` into or out of the minimized list and mirrors the flag on its record.
    ///
    /// Returns `true` when anything changed.
    pub fn set_minimized(&mut self, id: &WindowId, minimized: bool) -> bool {
        let mut changed = false;
        if let Some(record) = self.windows.get_mut(id) {
            if record.is_minimized != minimized {
                record.is_minimized = minimized;
                changed = true;
            }
        }

        let present = self.minimized_order.iter().any(|entry| entry == id);
        if minimized && !present && self.windows.contains_key(id) {
            self.minimized_order.insert(0, id.clone());
            changed = true;
        } else if !minimized && present {
            self.minimized_order.retain(|entry| entry != id);
            changed = true;
        }
        changed
    }

    /// Removes a record and its minimized entry.
    pub fn remove(&mut self, id: &WindowId) -> bool {
        let removed = self.windows.remove(id).is_some();
        let before = self.minimized_order.len();
        self.minimized_order.retain(|entry| entry != id);
        removed || before != self.minimized_order.len()
    }

    /// Re-derives `minimized_order` from the records, keeping the existing relative order.
    ///
    /// Duplicates, dangling ids, and ids of non-minimized records are dropped. Minimized records
    /// missing from the list are appended, most recently touched first. Returns `true` when the
    /// list changed.
    pub fn normalize_minimized_order(&mut self) -> bool {
        let mut normalized: Vec<WindowId> = Vec::with_capacity(self.minimized_order.len());
        for id in &self.minimized_order {
            let minimized = self
                .windows
                .get(id)
                .map(|record| record.is_minimized)
                .unwrap_or(false);
            if minimized && !normalized.contains(id) {
                normalized.push(id.clone());
            }
        }

        let mut missing: Vec<&WindowRecord> = self
            .windows
            .values()
            .filter(|record| record.is_minimized && !normalized.contains(&record.id))
            .collect();
        missing.sort_by(|a, b| b.last_touched.cmp(&a.last_touched));
        normalized.extend(missing.into_iter().map(|record| record.id.clone()));

        if normalized == self.minimized_order {
            return false;
        }
        self.minimized_order = normalized;
        true
    }

    /// Returns whether `minimized_order` lists exactly the minimized records, once each.
    pub fn minimized_order_is_consistent(&self) -> bool {
        let minimized_count = self.windows.values().filter(|r| r.is_minimized).count();
        let mut seen: Vec<&WindowId> = Vec::with_capacity(self.minimized_order.len());
        for id in &self.minimized_order {
            if seen.contains(&id) {
                return false;
            }
            match self.windows.get(id) {
                Some(record) if record.is_minimized => seen.push(id),
                _ => return false,
            }
        }
        seen.len() == minimized_count
    }

    /// Minimized records in `minimized_order`.
    pub fn minimized_records(&self) -> Vec<WindowRecord> {
        self.minimized_order
            .iter()
            .filter_map(|id| self.windows.get(id).cloned())
            .collect()
    }
}

/// Static configuration a hosting component supplies to open a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Unique id among open windows.
    pub id: WindowId,
    /// Title bar text.
    pub title: String,
    /// Optional icon name.
    pub icon: Option<String>,
    /// Position used when nothing is persisted.
    pub default_position: Option<WindowPosition>,
    /// Fixed window size.
    pub size: WindowSize,
    /// Page or route that opened the window.
    pub origin_url: Option<String>,
    /// Blocking modals are not draggable and share the page backdrop and scroll lock.
    pub blocking: bool,
}

impl WindowConfig {
    /// Starts a config with the default size and no optional fields.
    pub fn new(id: impl Into<WindowId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            icon: None,
            default_position: None,
            size: WindowSize::default(),
            origin_url: None,
            blocking: false,
        }
    }

    /// Sets the icon.
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Sets the position used when nothing is persisted.
    pub fn with_default_position(mut self, position: WindowPosition) -> Self {
        self.default_position = Some(position);
        self
    }

    /// Sets the window size.
    pub fn with_size(mut self, width: i32, height: i32) -> Self {
        self.size = WindowSize::new(width, height);
        self
    }

    /// Sets the origin route recorded with the window.
    pub fn with_origin_url(mut self, origin_url: impl Into<String>) -> Self {
        self.origin_url = Some(origin_url.into());
        self
    }

    /// Marks the window as a blocking, non-draggable modal.
    pub fn blocking(mut self) -> Self {
        self.blocking = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Pointer location in viewport pixels.
pub struct PointerPosition {
    /// Horizontal client coordinate.
    pub x: i32,
    /// Vertical client coordinate.
    pub y: i32,
}

impl PointerPosition {
    /// Creates a pointer position.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Lifecycle phase of a [`crate::controller::WindowController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowPhase {
    /// Created but not yet attached.
    Opening,
    /// Visible and idle.
    Normal,
    /// Following a pointer drag past the threshold.
    Dragging,
    /// Hidden; restorable from the tray.
    Minimized,
    /// Closed for good.
    Closed,
}

impl fmt::Display for WindowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Opening => "opening",
            Self::Normal => "normal",
            Self::Dragging => "dragging",
            Self::Minimized => "minimized",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Pointer gesture captured from the drag handle.
///
/// `active` flips once the pointer travels past the drag threshold; until then the press is
/// treated as a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragSession {
    /// Pointer location at press.
    pub pointer_start: PointerPosition,
    /// Window position at press.
    pub position_start: WindowPosition,
    /// Whether the press has moved past the drag threshold.
    pub active: bool,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn record(id: &str, minimized: bool, last_touched: u64) -> WindowRecord {
        WindowRecord {
            id: WindowId::new(id),
            position: WindowPosition::new(10, 90),
            z_index: 1000,
            is_minimized: minimized,
            title: id.to_uppercase(),
            icon: None,
            origin_url: None,
            last_touched,
        }
    }

    fn store_with(records: Vec<WindowRecord>) -> PersistedStore {
        let mut store = PersistedStore::empty(WINDOW_STORE_SCHEMA_VERSION);
        for record in records {
            store.windows.insert(record.id.clone(), record);
        }
        store
    }

    #[test]
    fn persisted_store_serialization_shape_uses_camel_case_keys() {
        let mut store = store_with(vec![record("labs", true, 42)]);
        store.minimized_order.push(WindowId::new("labs"));

        let value = serde_json::to_value(&store).expect("serialize store");
        assert_eq!(
            value,
            json!({
                "version": "1",
                "windows": {
                    "labs": {
                        "id": "labs",
                        "position": {"x": 10, "y": 90},
                        "zIndex": 1000,
                        "isMinimized": true,
                        "title": "LABS",
                        "lastTouched": 42
                    }
                },
                "minimizedOrder": ["labs"]
            })
        );
    }

    #[test]
    fn set_minimized_prepends_once_and_removes_on_restore() {
        let mut store = store_with(vec![record("a", false, 1), record("b", false, 1)]);
        let a = WindowId::new("a");
        let b = WindowId::new("b");

        assert!(store.set_minimized(&a, true));
        assert!(store.set_minimized(&b, true));
        assert!(!store.set_minimized(&b, true));
        assert_eq!(store.minimized_order, vec![b.clone(), a.clone()]);

        assert!(store.set_minimized(&b, false));
        assert_eq!(store.minimized_order, vec![a.clone()]);
        assert!(!store.windows[&b].is_minimized);
        assert!(store.minimized_order_is_consistent());
    }

    #[test]
    fn set_minimized_ignores_unknown_ids() {
        let mut store = store_with(vec![]);
        assert!(!store.set_minimized(&WindowId::new("ghost"), true));
        assert!(store.minimized_order.is_empty());
    }

    #[test]
    fn normalize_drops_duplicates_dangling_and_restored_ids() {
        let mut store = store_with(vec![
            record("a", true, 5),
            record("b", false, 5),
            record("c", true, 9),
            record("d", true, 3),
        ]);
        store.minimized_order = vec![
            WindowId::new("a"),
            WindowId::new("ghost"),
            WindowId::new("a"),
            WindowId::new("b"),
        ];

        assert!(store.normalize_minimized_order());
        assert_eq!(
            store.minimized_order,
            vec![WindowId::new("a"), WindowId::new("c"), WindowId::new("d")]
        );
        assert!(store.minimized_order_is_consistent());
        assert!(!store.normalize_minimized_order());
    }

    #[test]
    fn prune_expired_uses_strict_timeout_boundary() {
        let mut store = store_with(vec![record("fresh", false, 1_000), record("stale", false, 0)]);
        let removed = store.prune_expired(1_000 + SESSION_TIMEOUT_MS, SESSION_TIMEOUT_MS);
        assert_eq!(removed, 1);
        assert!(store.windows.contains_key(&WindowId::new("fresh")));
    }

    #[test]
    fn remove_strips_minimized_entry() {
        let mut store = store_with(vec![record("a", true, 1)]);
        store.minimized_order.push(WindowId::new("a"));
        assert!(store.remove(&WindowId::new("a")));
        assert!(store.windows.is_empty());
        assert!(store.minimized_order.is_empty());
    }
}
