//! Floating-window management for the clinical workspace.
//!
//! Windows are hosted through a [`WindowManager`], which hands out one [`WindowController`] per
//! window. Controllers clamp geometry through [`geometry`], take stacking slots from the shared
//! [`WindowRegistry`], and write layout through to the session-scoped [`WindowStore`] so windows
//! survive page reloads.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod components;
pub mod config;
pub mod controller;
pub mod geometry;
pub mod host;
pub mod manager;
pub mod model;
pub mod persistence;
pub mod registry;

pub use components::{
    provide_window_runtime, use_window_runtime, FloatingWindow, MinimizedWindowTray,
    ModalBackdrop, WindowRuntimeContext,
};
pub use config::{ConfigError, WindowRuntimeConfig, WINDOW_STORE_KEY, Z_INDEX_BASE};
pub use controller::{
    drag_instructions_id, ControllerError, KeyInput, WindowCallbacks, WindowController,
    WindowEvent, DRAG_INSTRUCTIONS,
};
pub use geometry::{constrain_to_viewport, default_center_position, GeometryConfig};
pub use host::WindowHostContext;
pub use manager::WindowManager;
pub use model::*;
pub use persistence::{WindowRecordUpdate, WindowStore};
pub use registry::WindowRegistry;
