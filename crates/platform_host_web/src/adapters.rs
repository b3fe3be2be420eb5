//! Concrete adapter factories for runtime wiring.

use crate::{BodyScrollLock, WebSessionStorage, WebViewport};

/// Returns the browser session storage adapter.
pub fn session_storage() -> WebSessionStorage {
    WebSessionStorage
}

/// Returns the browser viewport adapter.
pub fn viewport_source() -> WebViewport {
    WebViewport
}

/// Returns the `document.body` scroll-lock adapter.
pub fn body_scroll_lock() -> BodyScrollLock {
    BodyScrollLock
}
