//! Driving port for account lifecycle operations.
//!
//! HTTP handlers call [`AccountCommand`] to register, sign in, edit a
//! profile, or close an account. Every successful sign-in style operation
//! yields an [`AuthSession`] carrying a freshly issued token.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{
    AccessToken, Error, LoginCredentials, ProfileUpdate, Registration, User, UserId,
};

/// Public user data paired with a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AuthSession {
    /// Account summary. Never includes password material.
    pub user: User,
    /// Token to present as `Authorization: Bearer <token>`.
    pub token: AccessToken,
}

/// Account operations consumed by inbound adapters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create an account and sign it in.
    ///
    /// # Errors
    ///
    /// Returns a conflict error when the email is already registered.
    async fn register(&self, registration: Registration) -> Result<AuthSession, Error>;

    /// Exchange credentials for a token.
    ///
    /// # Errors
    ///
    /// Returns the same unauthorized error for an unknown email and for a
    /// wrong password.
    async fn login(&self, credentials: LoginCredentials) -> Result<AuthSession, Error>;

    /// Replace name, email and theme for the caller and issue a new token.
    ///
    /// # Errors
    ///
    /// Returns not found when the account vanished and conflict when the
    /// email belongs to someone else.
    async fn update_profile(
        &self,
        user_id: &UserId,
        update: ProfileUpdate,
    ) -> Result<AuthSession, Error>;

    /// Delete the caller together with every entry and playlist they own.
    async fn delete_account(&self, user_id: &UserId) -> Result<(), Error>;
}
