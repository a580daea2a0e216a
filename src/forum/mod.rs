//! Community forum
//!
//! Posts and replies pass through an automatic toxicity screen. Content at
//! the hold threshold waits unpublished for a moderator; content at the flag
//! threshold is published but marked for review.

pub mod moderation;
pub mod service;
pub mod types;

pub use moderation::{screen, toxicity_score, Screening};
pub use service::{ForumService, Viewer};
pub use types::*;
