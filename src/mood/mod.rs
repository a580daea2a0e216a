//! Mood tracking
//!
//! One self-reported entry per user per day, with streak bookkeeping and
//! period analysis (average, variance, trend and concern level).

pub mod analysis;
pub mod service;
pub mod types;

pub use analysis::{analyze_entries, concern_level, round1};
pub use service::MoodTracker;
pub use types::*;
