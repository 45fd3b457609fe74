//! User account model.
//!
//! Credential material never lives on [`User`]; password hashes travel
//! separately through [`crate::domain::StoredCredentials`] so a user summary
//! can be serialised to clients without risk of leaking secrets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Maximum length of a user name, in characters.
pub const USER_NAME_MAX: usize = 50;
/// Maximum length of an email address, in characters.
pub const EMAIL_MAX: usize = 254;

/// Validation errors raised by the user value constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("user id must be a valid UUID")]
    InvalidId,
    #[error("name must not be empty")]
    EmptyName,
    #[error("name must be at most {max} characters")]
    NameTooLong { max: usize },
    #[error("email must not be empty")]
    EmptyEmail,
    #[error("email must be a valid address")]
    InvalidEmail,
    #[error("theme must be one of: dark, light")]
    UnknownTheme,
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Parse a [`UserId`] from its canonical string form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Display name chosen at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
    /// Validate and construct a [`UserName`], trimming surrounding whitespace.
    pub fn new(name: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if trimmed.chars().count() > USER_NAME_MAX {
            return Err(UserValidationError::NameTooLong {
                max: USER_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserName> for String {
    fn from(value: UserName) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Normalised email address used as the login identifier.
///
/// ## Invariants
/// - Trimmed and lower-cased.
/// - Exactly one `@` separating a non-empty local part from a domain that
///   contains a dot which is neither leading nor trailing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and normalise an email address.
    ///
    /// # Examples
    /// ```
    /// use animelist::domain::EmailAddress;
    ///
    /// let email = EmailAddress::new("  Ada@Example.COM ").expect("valid email");
    /// assert_eq!(email.as_ref(), "ada@example.com");
    /// ```
    pub fn new(email: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = email.as_ref().trim().to_lowercase();
        if normalised.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if normalised.chars().count() > EMAIL_MAX || normalised.chars().any(char::is_whitespace) {
            return Err(UserValidationError::InvalidEmail);
        }
        let Some((local, domain)) = normalised.split_once('@') else {
            return Err(UserValidationError::InvalidEmail);
        };
        let domain_ok = domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
            && !domain.contains('@');
        if local.is_empty() || !domain_ok {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Colour theme preference persisted for the client.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Dark theme; the default for new accounts.
    #[default]
    Dark,
    /// Light theme.
    Light,
}

impl Theme {
    /// Stable lowercase string form used in storage and JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }
}

impl FromStr for Theme {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Self::Dark),
            "light" => Ok(Self::Light),
            _ => Err(UserValidationError::UnknownTheme),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registered account as exposed to clients.
///
/// ## Invariants
/// - Never carries password material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    id: UserId,
    #[schema(value_type = String, example = "Ada")]
    name: UserName,
    #[schema(value_type = String, example = "ada@example.com")]
    email: EmailAddress,
    theme: Theme,
    is_demo: bool,
}

impl User {
    /// Build a [`User`] from validated components.
    pub fn new(id: UserId, name: UserName, email: EmailAddress, theme: Theme, is_demo: bool) -> Self {
        Self {
            id,
            name,
            email,
            theme,
            is_demo,
        }
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &UserName {
        &self.name
    }

    /// Normalised email address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Preferred colour theme.
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Whether the account is a throwaway demo account.
    pub fn is_demo(&self) -> bool {
        self.is_demo
    }

    /// Return a copy with the profile fields replaced.
    #[must_use]
    pub fn with_profile(mut self, name: UserName, email: EmailAddress, theme: Theme) -> Self {
        self.name = name;
        self.email = email;
        self.theme = theme;
        self
    }
}

#[cfg(test)]
mod tests {
    //! Validation coverage for user value types.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", UserValidationError::EmptyName)]
    #[case("   ", UserValidationError::EmptyName)]
    #[case(&"x".repeat(USER_NAME_MAX + 1), UserValidationError::NameTooLong { max: USER_NAME_MAX })]
    fn invalid_names(#[case] input: &str, #[case] expected: UserValidationError) {
        assert_eq!(UserName::new(input).expect_err("invalid name"), expected);
    }

    #[rstest]
    fn names_are_trimmed() {
        let name = UserName::new("  Ada  ").expect("valid name");
        assert_eq!(name.as_ref(), "Ada");
    }

    #[rstest]
    #[case("", UserValidationError::EmptyEmail)]
    #[case("no-at-sign", UserValidationError::InvalidEmail)]
    #[case("@example.com", UserValidationError::InvalidEmail)]
    #[case("ada@localhost", UserValidationError::InvalidEmail)]
    #[case("ada@.com", UserValidationError::InvalidEmail)]
    #[case("ada@example.", UserValidationError::InvalidEmail)]
    #[case("a da@example.com", UserValidationError::InvalidEmail)]
    #[case("ada@ex@ample.com", UserValidationError::InvalidEmail)]
    fn invalid_emails(#[case] input: &str, #[case] expected: UserValidationError) {
        assert_eq!(EmailAddress::new(input).expect_err("invalid email"), expected);
    }

    #[rstest]
    #[case("ada@example.com", "ada@example.com")]
    #[case("  Ada@Example.COM ", "ada@example.com")]
    #[case("demo.user@mail.demo.io", "demo.user@mail.demo.io")]
    fn valid_emails_are_normalised(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(EmailAddress::new(input).expect("valid email").as_ref(), expected);
    }

    #[rstest]
    #[case("dark", Theme::Dark)]
    #[case("Light", Theme::Light)]
    fn themes_parse_case_insensitively(#[case] input: &str, #[case] expected: Theme) {
        assert_eq!(input.parse::<Theme>().expect("valid theme"), expected);
    }

    #[rstest]
    fn unknown_theme_is_rejected() {
        assert_eq!(
            "sepia".parse::<Theme>().expect_err("unknown theme"),
            UserValidationError::UnknownTheme
        );
    }

    #[rstest]
    fn user_id_rejects_padding_and_garbage() {
        assert_eq!(UserId::new(" 00000000-0000-0000-0000-000000000000"), Err(UserValidationError::InvalidId));
        assert_eq!(UserId::new("nope"), Err(UserValidationError::InvalidId));
    }

    #[rstest]
    fn user_serialises_without_secrets() {
        let user = User::new(
            UserId::from_uuid(Uuid::nil()),
            UserName::new("Ada").expect("name"),
            EmailAddress::new("ada@example.com").expect("email"),
            Theme::default(),
            false,
        );
        let value = serde_json::to_value(&user).expect("serialise user");
        assert_eq!(
            value,
            serde_json::json!({
                "id": "00000000-0000-0000-0000-000000000000",
                "name": "Ada",
                "email": "ada@example.com",
                "theme": "dark",
                "isDemo": false
            })
        );
    }
}
