//! Personalised recommendations
//!
//! Suggestions are drawn from fixed template pools chosen by the user's
//! recent mood average and expire after a week.

pub mod engine;
pub mod templates;

pub use engine::{GeneratedRecommendations, RecommendationEngine};
pub use templates::{MoodBand, RecommendationKind, Template};
