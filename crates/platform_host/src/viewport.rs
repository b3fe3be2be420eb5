//! Viewport measurement contracts.

use std::{cell::Cell, rc::Rc};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Visible page area in CSS pixels.
pub struct Viewport {
    /// Inner width.
    pub width: i32,
    /// Inner height.
    pub height: i32,
}

/// Viewport assumed when a host cannot report real dimensions.
pub const FALLBACK_VIEWPORT: Viewport = Viewport {
    width: 1024,
    height: 768,
};

/// Host service reporting the current viewport size.
pub trait ViewportSource {
    /// Returns the current viewport, or `None` outside a browser.
    fn viewport(&self) -> Option<Viewport>;
}

#[derive(Debug, Clone, Default)]
/// Settable viewport for headless hosts and tests. Clones share the same value.
pub struct MemoryViewport {
    current: Rc<Cell<Option<Viewport>>>,
}

impl MemoryViewport {
    /// Creates a viewport source reporting `width`×`height`.
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            current: Rc::new(Cell::new(Some(Viewport { width, height }))),
        }
    }

    /// Replaces the reported viewport.
    pub fn set(&self, viewport: Option<Viewport>) {
        self.current.set(viewport);
    }
}

impl ViewportSource for MemoryViewport {
    fn viewport(&self) -> Option<Viewport> {
        self.current.get()
    }
}
