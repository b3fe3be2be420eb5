//! Process-wide coordinator: session rehydration and controller construction.

use std::rc::Rc;

use platform_host::Viewport;

use crate::{
    config::WindowRuntimeConfig,
    controller::{ControllerError, WindowCallbacks, WindowController},
    host::WindowHostContext,
    model::{WindowConfig, WindowRecord},
    persistence::WindowStore,
    registry::WindowRegistry,
};

/// Shared entry point for hosting floating windows. Clones share the store and registry.
#[derive(Clone)]
pub struct WindowManager {
    config: Rc<WindowRuntimeConfig>,
    host: WindowHostContext,
    store: WindowStore,
    registry: WindowRegistry,
}

impl WindowManager {
    /// Creates a manager over `host` with a fresh registry.
    pub fn new(config: WindowRuntimeConfig, host: WindowHostContext) -> Self {
        let store = WindowStore::new(host.storage(), host.clock(), &config);
        let registry = WindowRegistry::new(config.z_index_base, host.scroll_lock());
        Self {
            config: Rc::new(config),
            host,
            store,
            registry,
        }
    }

    /// Runtime tunables.
    pub fn config(&self) -> &WindowRuntimeConfig {
        &self.config
    }

    /// Host services.
    pub fn host(&self) -> &WindowHostContext {
        &self.host
    }

    /// Persisted window store.
    pub fn store(&self) -> &WindowStore {
        &self.store
    }

    /// Z-order and backdrop registry.
    pub fn registry(&self) -> &WindowRegistry {
        &self.registry
    }

    /// Measures the viewport now.
    pub fn viewport(&self) -> Option<Viewport> {
        self.host.viewport()
    }

    /// Loads the persisted layout once at session start, pruning expired records.
    ///
    /// Returns the surviving records ordered bottom-to-top, so reopening them in order keeps
    /// their relative stacking.
    pub fn restore_session(&self) -> Vec<WindowRecord> {
        let Some(store) = self.store.load() else {
            return Vec::new();
        };
        let mut records: Vec<WindowRecord> = store.windows.into_values().collect();
        records.sort_by_key(|record| record.z_index);
        records
    }

    /// Builds an unattached controller for `config`.
    pub fn controller(&self, config: WindowConfig, callbacks: WindowCallbacks) -> WindowController {
        WindowController::new(
            config,
            self.config.clone(),
            self.store.clone(),
            self.registry.clone(),
            self.host.viewport_source(),
            callbacks,
        )
    }

    /// Builds and attaches a controller for `config`.
    ///
    /// # Errors
    ///
    /// Propagates [`WindowController::attach`] failures.
    pub fn open(
        &self,
        config: WindowConfig,
        callbacks: WindowCallbacks,
    ) -> Result<WindowController, ControllerError> {
        let mut controller = self.controller(config, callbacks);
        controller.attach()?;
        Ok(controller)
    }

    /// Persisted minimized windows, most recently minimized first.
    ///
    /// Nothing is expired here; a window minimized long ago stays restorable for as long as it is
    /// open.
    pub fn minimized_windows(&self) -> Vec<WindowRecord> {
        self.store
            .snapshot()
            .map(|store| store.minimized_records())
            .unwrap_or_default()
    }

    /// Forgets every remembered window layout.
    pub fn reset_layout(&self) {
        self.store.clear_all();
    }
}
