//! Counseling appointments
//!
//! Booking against a therapist's weekly availability, the session lifecycle,
//! private session notes and client reviews.

pub mod service;
pub mod types;

pub use service::AppointmentService;
pub use types::*;
