//! Host service bundle for the window runtime.
//!
//! Production wiring binds browser adapters from `platform_host_web`; tests inject in-memory
//! substitutes through [`WindowHostContext::new`].

use std::rc::Rc;

use platform_host::{Clock, ScrollLock, SessionStorage, SystemClock, Viewport, ViewportSource};

#[derive(Clone)]
/// Environment services the window runtime depends on.
pub struct WindowHostContext {
    storage: Rc<dyn SessionStorage>,
    viewport: Rc<dyn ViewportSource>,
    scroll_lock: Rc<dyn ScrollLock>,
    clock: Rc<dyn Clock>,
}

impl Default for WindowHostContext {
    fn default() -> Self {
        Self {
            storage: Rc::new(platform_host_web::session_storage()),
            viewport: Rc::new(platform_host_web::viewport_source()),
            scroll_lock: Rc::new(platform_host_web::body_scroll_lock()),
            clock: Rc::new(SystemClock),
        }
    }
}

impl WindowHostContext {
    /// Bundles explicitly supplied services.
    pub fn new(
        storage: Rc<dyn SessionStorage>,
        viewport: Rc<dyn ViewportSource>,
        scroll_lock: Rc<dyn ScrollLock>,
        clock: Rc<dyn Clock>,
    ) -> Self {
        Self {
            storage,
            viewport,
            scroll_lock,
            clock,
        }
    }

    /// Returns the configured session storage backend.
    pub fn storage(&self) -> Rc<dyn SessionStorage> {
        self.storage.clone()
    }

    /// Returns the configured viewport source.
    pub fn viewport_source(&self) -> Rc<dyn ViewportSource> {
        self.viewport.clone()
    }

    /// Returns the configured page scroll lock.
    pub fn scroll_lock(&self) -> Rc<dyn ScrollLock> {
        self.scroll_lock.clone()
    }

    /// Returns the configured clock.
    pub fn clock(&self) -> Rc<dyn Clock> {
        self.clock.clone()
    }

    /// Measures the viewport now.
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport.viewport()
    }
}
