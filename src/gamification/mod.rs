//! Points, daily streaks and achievements.

pub mod service;
pub mod streak;

pub use service::{GamificationService, GamificationSummary, Requirement};
pub use streak::Streak;
