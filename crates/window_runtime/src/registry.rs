//! Process-wide z-order assignment and shared modal backdrop bookkeeping.

use std::{
    cell::RefCell,
    collections::{BTreeSet, HashMap},
    rc::Rc,
};

use platform_host::ScrollLock;

use crate::model::WindowId;

struct RegistryState {
    next_z_index: u64,
    assigned: HashMap<WindowId, u64>,
    blocking: BTreeSet<WindowId>,
}

/// Sole writer of z-index assignments across open windows.
///
/// Values come from a counter that only grows, so every call to
/// [`WindowRegistry::acquire_z_index`] returns something strictly greater than any value handed
/// out before, including values still held by open windows. Clones share state.
#[derive(Clone)]
pub struct WindowRegistry {
    state: Rc<RefCell<RegistryState>>,
    scroll_lock: Rc<dyn ScrollLock>,
}

impl WindowRegistry {
    /// Creates a registry whose first z-index is `z_index_base`.
    pub fn new(z_index_base: u64, scroll_lock: Rc<dyn ScrollLock>) -> Self {
        Self {
            state: Rc::new(RefCell::new(RegistryState {
                next_z_index: z_index_base,
                assigned: HashMap::new(),
                blocking: BTreeSet::new(),
            })),
            scroll_lock,
        }
    }

    /// Returns the next z-index without assigning it to a window.
    pub fn acquire_z_index(&self) -> u64 {
        let mut state = self.state.borrow_mut();
        let z_index = state.next_z_index;
        state.next_z_index = state.next_z_index.saturating_add(1);
        z_index
    }

    /// Assigns a fresh z-index to `id`, putting it above every other open window.
    ///
    /// Registering an id that is already present replaces its slot (last registration wins).
    pub fn bring_to_front(&self, id: &WindowId) -> u64 {
        let z_index = self.acquire_z_index();
        self.state.borrow_mut().assigned.insert(id.clone(), z_index);
        z_index
    }

    /// Releases the z-index slot and any backdrop reference held by `id`.
    pub fn release(&self, id: &WindowId) {
        self.state.borrow_mut().assigned.remove(id);
        self.release_blocking(id);
    }

    /// Z-index currently assigned to `id`.
    pub fn z_index_of(&self, id: &WindowId) -> Option<u64> {
        self.state.borrow().assigned.get(id).copied()
    }

    /// Returns the open window with the highest z-index.
    pub fn topmost(&self) -> Option<WindowId> {
        self.state
            .borrow()
            .assigned
            .iter()
            .max_by_key(|(_, z)| **z)
            .map(|(id, _)| id.clone())
    }

    /// Whether `id` holds the highest assigned z-index.
    pub fn is_topmost(&self, id: &WindowId) -> bool {
        self.topmost().as_ref() == Some(id)
    }

    /// Number of windows holding a z-index slot.
    pub fn open_window_count(&self) -> usize {
        self.state.borrow().assigned.len()
    }

    /// Adds a backdrop reference for the blocking modal `id`.
    ///
    /// The first reference shows the backdrop and locks page scrolling. Repeated calls for the
    /// same id are ignored.
    pub fn retain_blocking(&self, id: &WindowId) {
        let newly_active = {
            let mut state = self.state.borrow_mut();
            let was_empty = state.blocking.is_empty();
            state.blocking.insert(id.clone()) && was_empty
        };
        if newly_active {
            self.scroll_lock.set_scroll_locked(true);
        }
    }

    /// Drops the backdrop reference for `id`. The last release unlocks page scrolling.
    pub fn release_blocking(&self, id: &WindowId) {
        let now_inactive = {
            let mut state = self.state.borrow_mut();
            state.blocking.remove(id) && state.blocking.is_empty()
        };
        if now_inactive {
            self.scroll_lock.set_scroll_locked(false);
        }
    }

    /// Whether the shared backdrop should be shown.
    pub fn backdrop_active(&self) -> bool {
        !self.state.borrow().blocking.is_empty()
    }

    /// Number of blocking modals holding the backdrop.
    pub fn blocking_count(&self) -> usize {
        self.state.borrow().blocking.len()
    }
}
