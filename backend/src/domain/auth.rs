//! Authentication primitives: credentials, password hashes, and tokens.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use zeroize::Zeroizing;

use super::user::{EmailAddress, Theme, User, UserId, UserName, UserValidationError};

/// Minimum password length, in characters.
pub const PASSWORD_MIN: usize = 6;

/// Validation failures for account payloads.
///
/// Each variant knows which request field it concerns so adapters can report
/// structured details.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialValidationError {
    /// The name failed validation.
    #[error("{0}")]
    Name(UserValidationError),
    /// The email failed validation.
    #[error("{0}")]
    Email(UserValidationError),
    /// The theme was not recognised.
    #[error("{0}")]
    Theme(UserValidationError),
    /// The password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
    /// The password was shorter than [`PASSWORD_MIN`].
    #[error("password must be at least {min} characters")]
    PasswordTooShort {
        /// Minimum accepted length.
        min: usize,
    },
}

impl CredentialValidationError {
    /// Name of the request field that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Name(_) => "name",
            Self::Email(_) => "email",
            Self::Theme(_) => "theme",
            Self::EmptyPassword | Self::PasswordTooShort { .. } => "password",
        }
    }

    /// Stable machine-readable code describing the failure.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Name(UserValidationError::NameTooLong { .. }) => "name_too_long",
            Self::Name(_) => "empty_name",
            Self::Email(UserValidationError::EmptyEmail) => "empty_email",
            Self::Email(_) => "invalid_email",
            Self::Theme(_) => "unknown_theme",
            Self::EmptyPassword => "empty_password",
            Self::PasswordTooShort { .. } => "password_too_short",
        }
    }
}

fn validate_new_password(password: &str) -> Result<Zeroizing<String>, CredentialValidationError> {
    if password.is_empty() {
        return Err(CredentialValidationError::EmptyPassword);
    }
    if password.chars().count() < PASSWORD_MIN {
        return Err(CredentialValidationError::PasswordTooShort { min: PASSWORD_MIN });
    }
    Ok(Zeroizing::new(password.to_owned()))
}

/// Validated login credentials used by the account service.
///
/// ## Invariants
/// - `email` is trimmed, lower-cased and non-empty. Its shape is not checked:
///   a malformed address simply never matches an account.
/// - `password` is non-empty and retains caller-provided whitespace.
///
/// # Examples
/// ```
/// use animelist::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" Ada@Example.com ", "secret").unwrap();
/// assert_eq!(creds.email(), "ada@example.com");
/// assert_eq!(creds.password(), "secret");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialValidationError> {
        let normalised = email.trim().to_lowercase();
        if normalised.is_empty() {
            return Err(CredentialValidationError::Email(UserValidationError::EmptyEmail));
        }
        if password.is_empty() {
            return Err(CredentialValidationError::EmptyPassword);
        }
        Ok(Self {
            email: normalised,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email used for the account lookup.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Validated registration request.
#[derive(Clone, PartialEq, Eq)]
pub struct Registration {
    name: UserName,
    email: EmailAddress,
    password: Zeroizing<String>,
    is_demo: bool,
}

impl Registration {
    /// Validate raw registration inputs.
    ///
    /// # Examples
    /// ```
    /// use animelist::domain::{CredentialValidationError, Registration};
    ///
    /// let err = Registration::try_from_parts("Ada", "ada@example.com", "123", false)
    ///     .unwrap_err();
    /// assert_eq!(err, CredentialValidationError::PasswordTooShort { min: 6 });
    /// ```
    pub fn try_from_parts(
        name: &str,
        email: &str,
        password: &str,
        is_demo: bool,
    ) -> Result<Self, CredentialValidationError> {
        let name = UserName::new(name).map_err(CredentialValidationError::Name)?;
        let email = EmailAddress::new(email).map_err(CredentialValidationError::Email)?;
        let password = validate_new_password(password)?;
        Ok(Self {
            name,
            email,
            password,
            is_demo,
        })
    }

    /// Requested display name.
    pub fn name(&self) -> &UserName {
        &self.name
    }

    /// Normalised email.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Plain-text password awaiting hashing.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Whether the account is a demo account.
    pub fn is_demo(&self) -> bool {
        self.is_demo
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("is_demo", &self.is_demo)
            .finish()
    }
}

/// Validated profile update. Every field is required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    name: UserName,
    email: EmailAddress,
    theme: Theme,
}

impl ProfileUpdate {
    /// Validate raw profile inputs.
    pub fn try_from_parts(
        name: &str,
        email: &str,
        theme: &str,
    ) -> Result<Self, CredentialValidationError> {
        Ok(Self {
            name: UserName::new(name).map_err(CredentialValidationError::Name)?,
            email: EmailAddress::new(email).map_err(CredentialValidationError::Email)?,
            theme: theme.parse().map_err(CredentialValidationError::Theme)?,
        })
    }

    /// New display name.
    pub fn name(&self) -> &UserName {
        &self.name
    }

    /// New email address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// New theme preference.
    pub fn theme(&self) -> Theme {
        self.theme
    }
}

/// Salted password hash in PHC string format.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a PHC-formatted hash string produced by a hasher adapter.
    pub fn new(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    /// PHC string for storage.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Account record as held by the credential store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    /// Public account data.
    pub user: User,
    /// Hash of the account password.
    pub password_hash: PasswordHash,
}

/// Signed bearer token handed to clients.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap an encoded token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Encoded token string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Identity resolved from a verified token.
///
/// Only the authorization gate constructs this from a request, so handlers
/// that receive one can trust the owner identifier it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    user_id: UserId,
    expires_at: DateTime<Utc>,
}

impl AuthenticatedUser {
    /// Build an identity from verified claims.
    pub fn new(user_id: UserId, expires_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            expires_at,
        }
    }

    /// Owner identifier for scoping queries.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Instant the underlying token stops being valid.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", "email", "empty_email")]
    #[case("   ", "pw", "email", "empty_email")]
    #[case("ada@example.com", "", "password", "empty_password")]
    fn invalid_login_credentials(
        #[case] email: &str,
        #[case] password: &str,
        #[case] field: &str,
        #[case] code: &str,
    ) {
        let err = LoginCredentials::try_from_parts(email, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err.field(), field);
        assert_eq!(err.code(), code);
    }

    #[rstest]
    #[case("", "ada@example.com", "secret", "name", "empty_name")]
    #[case("Ada", "ada", "secret", "email", "invalid_email")]
    #[case("Ada", "", "secret", "email", "empty_email")]
    #[case("Ada", "ada@example.com", "", "password", "empty_password")]
    #[case("Ada", "ada@example.com", "12345", "password", "password_too_short")]
    fn invalid_registrations(
        #[case] name: &str,
        #[case] email: &str,
        #[case] password: &str,
        #[case] field: &str,
        #[case] code: &str,
    ) {
        let err = Registration::try_from_parts(name, email, password, false)
            .expect_err("invalid registration");
        assert_eq!(err.field(), field);
        assert_eq!(err.code(), code);
    }

    #[rstest]
    fn registration_normalises_inputs() {
        let registration = Registration::try_from_parts(" Ada ", "ADA@example.com", "secret", true)
            .expect("valid registration");
        assert_eq!(registration.name().as_ref(), "Ada");
        assert_eq!(registration.email().as_ref(), "ada@example.com");
        assert_eq!(registration.password(), "secret");
        assert!(registration.is_demo());
    }

    #[rstest]
    fn profile_update_rejects_unknown_theme() {
        let err = ProfileUpdate::try_from_parts("Ada", "ada@example.com", "sepia")
            .expect_err("unknown theme");
        assert_eq!(err.field(), "theme");
        assert_eq!(err.code(), "unknown_theme");
    }

    #[rstest]
    fn debug_output_redacts_secrets() {
        let creds = LoginCredentials::try_from_parts("ada@example.com", "hunter22").expect("valid");
        let hash = PasswordHash::new("$argon2id$v=19$secret");
        let token = AccessToken::new("header.payload.signature");
        let rendered = format!("{creds:?} {hash:?} {token:?}");
        assert!(!rendered.contains("hunter22"));
        assert!(!rendered.contains("argon2id"));
        assert!(!rendered.contains("signature"));
    }
}
