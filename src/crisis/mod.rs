//! Crisis detection and response
//!
//! User text from chat, mood notes, journals and the forum is scanned for
//! crisis keywords. A match raises a `crisis_alerts` row that staff work
//! through until it is resolved.

pub mod detector;
pub mod service;
pub mod types;

pub use detector::CrisisDetector;
pub use service::CrisisService;
pub use types::*;
