//! Therapist directory
//!
//! Professional profiles, verification by admins, search and weekly
//! availability slots used by appointment booking.

pub mod directory;
pub mod types;

pub use directory::TherapistDirectory;
pub use types::*;
