//! Port for salted password hashing.

use crate::domain::PasswordHash;

use super::define_port_error;

define_port_error! {
    /// Hashing failures.
    pub enum PasswordHashError {
        /// The hasher could not produce a hash.
        Hashing { message: String } => "password hashing failed: {message}",
    }
}

/// Salted, slow password hashing.
///
/// Implementations are CPU-heavy; callers run them off the async executor.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Hash `password` with a fresh random salt.
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHashError>;

    /// Check `password` against a stored hash. Malformed hashes never match.
    fn verify(&self, password: &str, hash: &PasswordHash) -> bool;

    /// Spend the same effort as [`PasswordHasher::verify`] against a fixed
    /// hash, for lookups that found no account.
    fn verify_dummy(&self, password: &str);
}
