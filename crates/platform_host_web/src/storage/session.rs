//! `sessionStorage`-backed implementation of [`platform_host::SessionStorage`].

use platform_host::{SessionStorage, StorageError};

#[derive(Debug, Clone, Copy, Default)]
/// Session storage backed by `window.sessionStorage`.
pub struct WebSessionStorage;

#[cfg(target_arch = "wasm32")]
fn browser_session_storage() -> Result<web_sys::Storage, StorageError> {
    web_sys::window()
        .and_then(|w| w.session_storage().ok().flatten())
        .ok_or(StorageError::Unavailable)
}

#[cfg(target_arch = "wasm32")]
fn classify_write_error(err: wasm_bindgen::JsValue) -> StorageError {
    use wasm_bindgen::JsCast;

    match err.dyn_ref::<web_sys::DomException>() {
        // Firefox reports NS_ERROR_DOM_QUOTA_REACHED; other engines use the standard name/code.
        Some(ex)
            if ex.name() == "QuotaExceededError"
                || ex.name() == "NS_ERROR_DOM_QUOTA_REACHED"
                || ex.code() == 22 =>
        {
            StorageError::QuotaExceeded
        }
        _ => StorageError::Backend(format!("{err:?}")),
    }
}

impl SessionStorage for WebSessionStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        #[cfg(target_arch = "wasm32")]
        {
            browser_session_storage()?
                .get_item(key)
                .map_err(|e| StorageError::Backend(format!("sessionStorage get_item failed: {e:?}")))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = key;
            Ok(None)
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        #[cfg(target_arch = "wasm32")]
        {
            browser_session_storage()?
                .set_item(key, value)
                .map_err(classify_write_error)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (key, value);
            Ok(())
        }
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        #[cfg(target_arch = "wasm32")]
        {
            browser_session_storage()?.remove_item(key).map_err(|e| {
                StorageError::Backend(format!("sessionStorage remove_item failed: {e:?}"))
            })
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = key;
            Ok(())
        }
    }
}
