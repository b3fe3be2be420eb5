//! Browser storage adapters.

pub mod session;
