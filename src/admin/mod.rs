//! Staff administration
//!
//! Aggregate dashboards, the daily analytics snapshot and account actions.
//! Every mutating action is written to the audit trail.

pub mod analytics;
pub mod types;
pub mod users;

pub use analytics::AnalyticsService;
pub use types::*;
pub use users::UserAdmin;
