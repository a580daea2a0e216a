//! User accounts
//!
//! Registration, login, profiles and emergency contacts.

pub mod service;
pub mod types;

pub use service::AccountService;
pub use types::*;
