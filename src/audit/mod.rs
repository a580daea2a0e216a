//! Audit trail
//!
//! Append-only record of security-relevant actions (registration, admin and
//! moderation decisions) kept for compliance.

pub mod logger;

pub use logger::AuditLogger;
