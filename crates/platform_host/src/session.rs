//! Session-scoped key/value storage contracts and in-memory adapters.
//!
//! The contract mirrors the browser `sessionStorage` API: synchronous, string-valued, and able to
//! fail when the medium is unavailable or full.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Failures reported by a [`SessionStorage`] backend.
pub enum StorageError {
    /// No storage medium is available in the current environment.
    #[error("session storage unavailable")]
    Unavailable,
    /// The write would exceed the storage quota.
    #[error("session storage quota exceeded")]
    QuotaExceeded,
    /// Any other backend failure.
    #[error("session storage backend error: {0}")]
    Backend(String),
}

/// Synchronous string key/value storage scoped to one browsing session.
pub trait SessionStorage {
    /// Reads the raw string stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any prior value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::QuotaExceeded`] when the medium is full, or another variant when
    /// the write fails.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key` if present.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be written.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Clone, Default)]
/// In-memory session storage with an optional byte quota.
///
/// Clones share the same backing map, so a test can keep one handle for inspection while the
/// runtime writes through another.
pub struct MemorySessionStorage {
    inner: Rc<RefCell<HashMap<String, String>>>,
    quota_bytes: Option<usize>,
}

impl MemorySessionStorage {
    /// Creates a store that rejects writes once the total stored bytes would exceed `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            inner: Rc::default(),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Returns the raw value under `key` without going through the trait.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.inner.borrow().get(key).cloned()
    }

    /// Returns the number of stored keys.
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    /// Returns whether no keys are stored.
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    fn used_bytes_excluding(&self, key: &str) -> usize {
        self.inner
            .borrow()
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.raw(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota_bytes {
            if self.used_bytes_excluding(key) + key.len() + value.len() > quota {
                return Err(StorageError::QuotaExceeded);
            }
        }
        self.inner
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.inner.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn memory_storage_set_get_remove() {
        let store = MemorySessionStorage::default();
        let store_obj: &dyn SessionStorage = &store;

        store_obj.set_item("k", "{\"v\":1}").expect("set");
        assert_eq!(
            store_obj.get_item("k").expect("get"),
            Some("{\"v\":1}".to_string())
        );
        store_obj.remove_item("k").expect("remove");
        assert_eq!(store_obj.get_item("k").expect("get"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn memory_storage_clones_share_backing_map() {
        let store = MemorySessionStorage::default();
        let other = store.clone();
        store.set_item("a", "1").expect("set");
        assert_eq!(other.raw("a"), Some("1".to_string()));
    }

    #[test]
    fn quota_rejects_oversized_writes_but_allows_overwrite_within_quota() {
        let store = MemorySessionStorage::with_quota(10);
        store.set_item("k", "12345").expect("fits");
        store.set_item("k", "123456789").expect("overwrite replaces old value");
        assert_eq!(
            store.set_item("k", "1234567890"),
            Err(StorageError::QuotaExceeded)
        );
        assert_eq!(store.raw("k"), Some("123456789".to_string()));
    }
}
