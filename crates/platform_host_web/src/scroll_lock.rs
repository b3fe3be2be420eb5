//! `document.body` class toggle used as the page scroll lock.

use platform_host::ScrollLock;

/// Class applied to `document.body` while scrolling is locked.
pub const NO_SCROLL_CLASS: &str = "no-scroll";

#[derive(Debug, Clone, Copy, Default)]
/// Scroll lock that toggles [`NO_SCROLL_CLASS`] on `document.body`.
pub struct BodyScrollLock;

impl ScrollLock for BodyScrollLock {
    fn set_scroll_locked(&self, locked: bool) {
        #[cfg(target_arch = "wasm32")]
        {
            let Some(body) = web_sys::window()
                .and_then(|window| window.document())
                .and_then(|document| document.body())
            else {
                return;
            };
            let _ = body.class_list().toggle_with_force(NO_SCROLL_CLASS, locked);
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = locked;
        }
    }
}
