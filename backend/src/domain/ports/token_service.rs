//! Port for issuing and verifying signed identity tokens.
//!
//! Token operations are CPU-bound and fast, so the trait is synchronous.

use crate::domain::{AccessToken, AuthenticatedUser, UserId};

use super::define_port_error;

define_port_error! {
    /// Reasons a presented token was rejected.
    pub enum InvalidTokenError {
        /// The token could not be decoded or its claims are incomplete.
        Malformed => "token is malformed",
        /// The signature does not match the configured secret.
        BadSignature => "token signature is invalid",
        /// The token lifetime has elapsed.
        Expired => "token has expired",
    }
}

define_port_error! {
    /// Failure to produce a token.
    pub enum TokenIssueError {
        /// The signer rejected the claims or key.
        Signing { message: String } => "failed to sign token: {message}",
    }
}

/// Issues and verifies bearer tokens.
#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    /// Create a token embedding `user_id`.
    fn issue(&self, user_id: &UserId) -> Result<AccessToken, TokenIssueError>;

    /// Validate signature and expiry and return the embedded identity.
    fn verify(&self, token: &str) -> Result<AuthenticatedUser, InvalidTokenError>;
}
