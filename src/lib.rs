pub mod accounts;
pub mod admin;
pub mod api;
pub mod appointments;
pub mod audit;
pub mod auth;
pub mod chat;
pub mod config;
pub mod crisis;
pub mod database;
pub mod error;
pub mod forum;
pub mod gamification;
pub mod mood;
pub mod notifications;
pub mod recommendations;
pub mod resources;
pub mod site;
pub mod state;
pub mod therapists;
pub mod validation;
pub mod wellness;

pub use error::{AppError, AppResult};
pub use state::AppState;
