//! Browser (`wasm32`) implementations of [`platform_host`] service contracts.
//!
//! Each adapter compiles on every target; outside `wasm32` they degrade to the behavior of a
//! browser with no storage, no measurable viewport, and no document body.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod adapters;
pub mod scroll_lock;
pub mod storage;
pub mod viewport;

pub use adapters::{body_scroll_lock, session_storage, viewport_source};
pub use scroll_lock::{BodyScrollLock, NO_SCROLL_CLASS};
pub use storage::session::WebSessionStorage;
pub use viewport::WebViewport;
