//! Educational resource library with per-user interactions.

pub mod service;
pub mod types;

pub use service::ResourceLibrary;
pub use types::*;
