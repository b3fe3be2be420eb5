//! Page scroll-lock contracts.

use std::{cell::Cell, rc::Rc};

/// Host service that locks or unlocks page scrolling behind modal overlays.
pub trait ScrollLock {
    /// Applies the lock state. Calls are idempotent.
    fn set_scroll_locked(&self, locked: bool);
}

#[derive(Debug, Clone, Default)]
/// Recording scroll lock for headless hosts and tests. Clones share state.
pub struct MemoryScrollLock {
    locked: Rc<Cell<bool>>,
    transitions: Rc<Cell<u32>>,
}

impl MemoryScrollLock {
    /// Returns whether scrolling is currently locked.
    pub fn is_locked(&self) -> bool {
        self.locked.get()
    }

    /// Returns how many times the lock state actually changed.
    pub fn transitions(&self) -> u32 {
        self.transitions.get()
    }
}

impl ScrollLock for MemoryScrollLock {
    fn set_scroll_locked(&self, locked: bool) {
        if self.locked.get() != locked {
            self.locked.set(locked);
            self.transitions.set(self.transitions.get() + 1);
        }
    }
}
