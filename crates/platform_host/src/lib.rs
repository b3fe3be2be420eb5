//! Typed host-domain contracts shared by the window runtime and its browser adapters.
//!
//! This crate is the API-first boundary for the services the floating-window subsystem needs from
//! its environment: session-scoped key/value storage, viewport measurement, page scroll locking,
//! and wall-clock time. Concrete browser adapters live in `platform_host_web`; the in-memory
//! implementations here back headless builds and tests.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod scroll_lock;
pub mod session;
pub mod time;
pub mod viewport;

pub use scroll_lock::{MemoryScrollLock, ScrollLock};
pub use session::{MemorySessionStorage, SessionStorage, StorageError};
pub use time::{unix_time_ms_now, Clock, ManualClock, SystemClock};
pub use viewport::{MemoryViewport, Viewport, ViewportSource, FALLBACK_VIEWPORT};
