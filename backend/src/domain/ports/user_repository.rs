//! Port abstraction for the credential store and its errors.

use async_trait::async_trait;

use crate::domain::{EmailAddress, StoredCredentials, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses the email address.
        DuplicateEmail { email: String } => "email already registered: {email}",
    }
}

/// Credential store port.
///
/// Adapters must enforce email uniqueness themselves (a unique index or an
/// equivalent check under a write lock) and report violations as
/// [`UserPersistenceError::DuplicateEmail`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account.
    async fn insert(&self, account: &StoredCredentials) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch an account and its password hash by normalised email.
    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError>;

    /// Whether any account uses `email`.
    async fn email_exists(&self, email: &EmailAddress) -> Result<bool, UserPersistenceError>;

    /// Overwrite the profile fields of an existing user.
    ///
    /// Returns `false` when no user with that identifier exists.
    async fn update_profile(&self, user: &User) -> Result<bool, UserPersistenceError>;

    /// Delete a user together with every anime entry and playlist they own,
    /// atomically.
    ///
    /// Returns `false` when no user with that identifier exists.
    async fn delete_with_owned_resources(&self, id: &UserId)
    -> Result<bool, UserPersistenceError>;
}
