//! Wellness activities and journaling.

pub mod service;
pub mod types;

pub use service::WellnessService;
pub use types::*;
