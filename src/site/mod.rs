//! Public pages and the signed-in user's dashboard.

pub mod pages;
pub mod types;

pub use pages::SiteService;
pub use types::*;
