//! Request middleware.
//!
//! Cross-cutting request concerns: trace identifiers and bearer-token
//! authorization.

pub mod auth;
pub mod trace;

pub use auth::BearerAuth;
pub use trace::Trace;
