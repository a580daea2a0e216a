//! Support chat
//!
//! Sessions with a scripted bot. Replies are drawn from keyword-matched
//! template lists; messages matching the crisis list get a fixed crisis
//! reply and raise an alert.

pub mod responder;
pub mod service;
pub mod types;

pub use responder::{extract_keywords, BotReply, ResponseGenerator};
pub use service::ChatService;
pub use types::*;
