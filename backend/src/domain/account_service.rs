//! Account lifecycle service implementing [`AccountCommand`].
//!
//! Password hashing and verification are CPU-bound, so they run on the
//! blocking thread pool. Login spends the same hashing effort whether or not
//! the email matched an account, and reports both failures identically.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use zeroize::Zeroizing;

use crate::domain::ports::{
    AccountCommand, AuthSession, PasswordHasher, TokenService, UserPersistenceError,
    UserRepository,
};
use crate::domain::{
    EmailAddress, Error, LoginCredentials, ProfileUpdate, Registration, StoredCredentials, Theme,
    User, UserId,
};

const INVALID_CREDENTIALS: &str = "invalid credentials";

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { .. } => duplicate_email(),
    }
}

fn duplicate_email() -> Error {
    Error::conflict("email already registered").with_details(json!({
        "field": "email",
        "code": "duplicate_email",
    }))
}

async fn run_blocking<R, F>(task: F) -> Result<R, Error>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|err| Error::internal(format!("password worker failed: {err}")))
}

/// Account service over a credential store, a hasher and a token signer.
#[derive(Clone)]
pub struct AccountService<U, H, T> {
    users: Arc<U>,
    hasher: Arc<H>,
    tokens: Arc<T>,
}

impl<U, H, T> AccountService<U, H, T> {
    /// Create a new service from its collaborators.
    pub fn new(users: Arc<U>, hasher: Arc<H>, tokens: Arc<T>) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }
}

impl<U, H, T> AccountService<U, H, T>
where
    U: UserRepository,
    H: PasswordHasher + 'static,
    T: TokenService,
{
    fn session_for(&self, user: User) -> Result<AuthSession, Error> {
        let token = self
            .tokens
            .issue(user.id())
            .map_err(|err| Error::internal(err.to_string()))?;
        Ok(AuthSession { user, token })
    }

    async fn ensure_email_free(&self, email: &EmailAddress) -> Result<(), Error> {
        let taken = self
            .users
            .email_exists(email)
            .await
            .map_err(map_user_error)?;
        if taken {
            return Err(duplicate_email());
        }
        Ok(())
    }

    async fn check_password(
        &self,
        password: &str,
        stored: Option<StoredCredentials>,
    ) -> Result<Option<User>, Error> {
        let hasher = Arc::clone(&self.hasher);
        let password = Zeroizing::new(password.to_owned());
        run_blocking(move || match stored {
            Some(stored) => hasher
                .verify(password.as_str(), &stored.password_hash)
                .then_some(stored.user),
            None => {
                hasher.verify_dummy(password.as_str());
                None
            }
        })
        .await
    }
}

#[async_trait]
impl<U, H, T> AccountCommand for AccountService<U, H, T>
where
    U: UserRepository,
    H: PasswordHasher + 'static,
    T: TokenService,
{
    async fn register(&self, registration: Registration) -> Result<AuthSession, Error> {
        self.ensure_email_free(registration.email()).await?;

        let hasher = Arc::clone(&self.hasher);
        let password = Zeroizing::new(registration.password().to_owned());
        let password_hash = run_blocking(move || hasher.hash(password.as_str()))
            .await?
            .map_err(|err| Error::internal(err.to_string()))?;

        let user = User::new(
            UserId::random(),
            registration.name().clone(),
            registration.email().clone(),
            Theme::default(),
            registration.is_demo(),
        );
        let account = StoredCredentials {
            user,
            password_hash,
        };
        self.users.insert(&account).await.map_err(map_user_error)?;
        self.session_for(account.user)
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<AuthSession, Error> {
        let stored = self
            .users
            .find_credentials_by_email(credentials.email())
            .await
            .map_err(map_user_error)?;
        let user = self
            .check_password(credentials.password(), stored)
            .await?
            .ok_or_else(|| Error::unauthorized(INVALID_CREDENTIALS))?;
        self.session_for(user)
    }

    async fn update_profile(
        &self,
        user_id: &UserId,
        update: ProfileUpdate,
    ) -> Result<AuthSession, Error> {
        let current = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("user not found"))?;

        if current.email() != update.email() {
            self.ensure_email_free(update.email()).await?;
        }

        let updated = current.with_profile(
            update.name().clone(),
            update.email().clone(),
            update.theme(),
        );
        let found = self
            .users
            .update_profile(&updated)
            .await
            .map_err(map_user_error)?;
        if !found {
            return Err(Error::not_found("user not found"));
        }
        self.session_for(updated)
    }

    async fn delete_account(&self, user_id: &UserId) -> Result<(), Error> {
        let deleted = self
            .users
            .delete_with_owned_resources(user_id)
            .await
            .map_err(map_user_error)?;
        if deleted {
            Ok(())
        } else {
            Err(Error::not_found("user not found"))
        }
    }
}
