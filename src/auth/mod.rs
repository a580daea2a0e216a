//! Authentication
//!
//! Password hashing, bearer-token sessions and the request extractor that
//! resolves the calling user.

pub mod extractor;
pub mod password;
pub mod session;

pub use extractor::AuthUser;
pub use session::SessionStore;
