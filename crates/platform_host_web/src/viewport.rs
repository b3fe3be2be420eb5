//! Browser viewport measurement.

use platform_host::{Viewport, ViewportSource};

#[derive(Debug, Clone, Copy, Default)]
/// Viewport source reading `window.innerWidth` / `window.innerHeight`.
pub struct WebViewport;

impl ViewportSource for WebViewport {
    fn viewport(&self) -> Option<Viewport> {
        #[cfg(target_arch = "wasm32")]
        {
            let window = web_sys::window()?;
            let width = window.inner_width().ok()?.as_f64()? as i32;
            let height = window.inner_height().ok()?.as_f64()? as i32;
            Some(Viewport { width, height })
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            None
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn non_browser_viewport_is_unavailable() {
        assert_eq!(WebViewport.viewport(), None);
    }
}
