//! Argon2id adapter for the [`PasswordHasher`] port.

use argon2::Argon2;
use argon2::password_hash::{
    PasswordHash as PhcString, PasswordHasher as _, PasswordVerifier, SaltString,
};
use tracing::warn;

use crate::domain::PasswordHash;
use crate::domain::ports::{PasswordHashError, PasswordHasher};

const DUMMY_PASSWORD: &str = "animelist-timing-equaliser";

fn salt() -> Result<SaltString, PasswordHashError> {
    let bytes = rand::random::<[u8; 16]>();
    SaltString::encode_b64(&bytes).map_err(|err| PasswordHashError::hashing(err.to_string()))
}

/// Argon2id hasher with the crate's default parameters and a 16-byte random
/// salt per hash.
///
/// Construction hashes a fixed dummy password so that logins for unknown
/// emails pay the same verification cost from the first request on.
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
    dummy: Option<PasswordHash>,
}

impl Argon2PasswordHasher {
    /// Create a hasher and prepare its dummy hash.
    pub fn new() -> Self {
        let mut hasher = Self {
            argon2: Argon2::default(),
            dummy: None,
        };
        hasher.dummy = match hasher.hash(DUMMY_PASSWORD) {
            Ok(hash) => Some(hash),
            Err(err) => {
                warn!(error = %err, "failed to prepare dummy password hash");
                None
            }
        };
        hasher
    }
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHashError> {
        let salt = salt()?;
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|phc| PasswordHash::new(phc.to_string()))
            .map_err(|err| PasswordHashError::hashing(err.to_string()))
    }

    fn verify(&self, password: &str, hash: &PasswordHash) -> bool {
        PhcString::new(hash.as_str()).is_ok_and(|parsed| {
            self.argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
    }

    fn verify_dummy(&self, password: &str) {
        if let Some(dummy) = &self.dummy {
            let _ = self.verify(password, dummy);
        }
    }
}

#[cfg(test)]
mod tests {
    //! Hash format and verification coverage.
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn hasher() -> Argon2PasswordHasher {
        Argon2PasswordHasher::new()
    }

    #[rstest]
    fn hashes_are_salted_phc_strings(hasher: Argon2PasswordHasher) {
        let first = hasher.hash("secret").expect("hash");
        let second = hasher.hash("secret").expect("hash");
        assert!(first.as_str().starts_with("$argon2id$"));
        assert_ne!(first, second);
    }

    #[rstest]
    #[case("secret", true)]
    #[case("Secret", false)]
    #[case("", false)]
    fn verify_matches_only_the_original(
        hasher: Argon2PasswordHasher,
        #[case] attempt: &str,
        #[case] expected: bool,
    ) {
        let hash = hasher.hash("secret").expect("hash");
        assert_eq!(hasher.verify(attempt, &hash), expected);
    }

    #[rstest]
    fn malformed_hashes_never_match(hasher: Argon2PasswordHasher) {
        assert!(!hasher.verify("secret", &PasswordHash::new("plaintext")));
    }

    #[rstest]
    fn dummy_hash_is_ready_before_first_login(hasher: Argon2PasswordHasher) {
        let dummy = hasher.dummy.clone().expect("dummy prepared at construction");
        assert!(hasher.verify(DUMMY_PASSWORD, &dummy));
        hasher.verify_dummy("anything");
        assert_eq!(hasher.dummy, Some(dummy));
    }
}
