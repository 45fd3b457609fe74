//! HS256 JWT adapter for the [`TokenService`] port.
//!
//! Tokens carry `sub` (user UUID), `iat` and `exp`. Both issuing and expiry
//! checks read the injected [`Clock`]; a token is rejected once the clock
//! reaches its `exp`.

use std::fmt;
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mockable::Clock;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::domain::ports::{InvalidTokenError, TokenIssueError, TokenService};
use crate::domain::{AccessToken, AuthenticatedUser, UserId};

/// Minimum signing secret length, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Rejected signing secret.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JwtSecretError {
    /// The secret is shorter than [`MIN_SECRET_LEN`].
    #[error("signing secret must be at least {min} bytes, got {actual}")]
    TooShort {
        /// Required length.
        min: usize,
        /// Supplied length.
        actual: usize,
    },
}

/// Process-wide HMAC signing secret.
#[derive(Clone)]
pub struct JwtSecret(Zeroizing<Vec<u8>>);

impl JwtSecret {
    /// Accept a secret of at least [`MIN_SECRET_LEN`] bytes.
    ///
    /// Surrounding whitespace is trimmed so secrets read from files keep
    /// working with a trailing newline.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, JwtSecretError> {
        let trimmed = bytes.trim_ascii();
        if trimmed.len() < MIN_SECRET_LEN {
            return Err(JwtSecretError::TooShort {
                min: MIN_SECRET_LEN,
                actual: trimmed.len(),
            });
        }
        Ok(Self(Zeroizing::new(trimmed.to_vec())))
    }

    /// Generate a random secret valid for this process only.
    pub fn ephemeral() -> Self {
        let mut bytes = Zeroizing::new([0_u8; 64]);
        rand::thread_rng().fill(&mut bytes[..]);
        Self(Zeroizing::new(bytes.to_vec()))
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }
}

impl fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JwtSecret(<redacted>)")
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    iat: i64,
    exp: i64,
}

/// Signs and verifies access tokens with a shared HMAC secret.
pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl JwtTokenService {
    /// Build a service issuing tokens that live for `ttl` as measured by
    /// `clock`.
    pub fn new(secret: &JwtSecret, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
            clock,
        }
    }
}

fn map_decode_error(error: &jsonwebtoken::errors::Error) -> InvalidTokenError {
    match error.kind() {
        ErrorKind::ExpiredSignature => InvalidTokenError::expired(),
        ErrorKind::InvalidSignature => InvalidTokenError::bad_signature(),
        _ => InvalidTokenError::malformed(),
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, user_id: &UserId) -> Result<AccessToken, TokenIssueError> {
        let issued_at = self.clock.utc();
        let claims = Claims {
            sub: *user_id.as_uuid(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map(AccessToken::new)
            .map_err(|err| TokenIssueError::signing(err.to_string()))
    }

    fn verify(&self, token: &str) -> Result<AuthenticatedUser, InvalidTokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|err| map_decode_error(&err))?;
        if data.claims.exp <= self.clock.utc().timestamp() {
            return Err(InvalidTokenError::expired());
        }
        let expires_at = Utc
            .timestamp_opt(data.claims.exp, 0)
            .single()
            .ok_or_else(InvalidTokenError::malformed)?;
        Ok(AuthenticatedUser::new(
            UserId::from_uuid(data.claims.sub),
            expires_at,
        ))
    }
}

#[cfg(test)]
mod tests {
    //! Issue/verify coverage including expiry and tampering.
    use super::*;
    use crate::test_support::{FixtureClock, fixture_timestamp};
    use rstest::{fixture, rstest};

    const SECRET: &[u8] = b"an-adequately-long-test-signing-secret";
    const TTL_MINUTES: i64 = 60;

    struct Harness {
        clock: Arc<FixtureClock>,
        service: JwtTokenService,
    }

    #[fixture]
    fn harness() -> Harness {
        let clock = Arc::new(FixtureClock::default());
        let secret = JwtSecret::from_bytes(SECRET).expect("valid secret");
        let service = JwtTokenService::new(
            &secret,
            Duration::minutes(TTL_MINUTES),
            Arc::clone(&clock) as Arc<dyn Clock>,
        );
        Harness { clock, service }
    }

    #[rstest]
    fn verify_returns_issued_identity(harness: Harness) {
        let user_id = UserId::random();
        let token = harness.service.issue(&user_id).expect("issue");
        let verified = harness.service.verify(token.as_str()).expect("verify");
        assert_eq!(verified.user_id(), &user_id);
        assert_eq!(
            verified.expires_at(),
            fixture_timestamp() + Duration::minutes(TTL_MINUTES)
        );
    }

    #[rstest]
    #[case(Duration::minutes(TTL_MINUTES) - Duration::seconds(1), None)]
    #[case(Duration::minutes(TTL_MINUTES), Some(InvalidTokenError::Expired))]
    #[case(Duration::days(2), Some(InvalidTokenError::Expired))]
    fn expiry_follows_the_clock(
        harness: Harness,
        #[case] elapsed: Duration,
        #[case] expected: Option<InvalidTokenError>,
    ) {
        let token = harness.service.issue(&UserId::random()).expect("issue");
        harness.clock.advance(elapsed);
        assert_eq!(harness.service.verify(token.as_str()).err(), expected);
    }

    #[rstest]
    fn tokens_from_another_secret_fail_signature_check(harness: Harness) {
        let other = JwtTokenService::new(
            &JwtSecret::ephemeral(),
            Duration::minutes(TTL_MINUTES),
            Arc::new(FixtureClock::default()),
        );
        let token = other.issue(&UserId::random()).expect("issue");
        assert_eq!(
            harness.service.verify(token.as_str()),
            Err(InvalidTokenError::bad_signature())
        );
    }

    #[rstest]
    #[case("")]
    #[case("not-a-jwt")]
    #[case("a.b.c")]
    fn garbage_is_malformed(harness: Harness, #[case] token: &str) {
        assert_eq!(
            harness.service.verify(token),
            Err(InvalidTokenError::malformed())
        );
    }

    #[rstest]
    fn short_secrets_are_rejected() {
        assert_eq!(
            JwtSecret::from_bytes(b"short\n").map(|_| ()),
            Err(JwtSecretError::TooShort {
                min: MIN_SECRET_LEN,
                actual: 5
            })
        );
    }

    #[rstest]
    fn secret_debug_is_redacted() {
        let secret = JwtSecret::from_bytes(SECRET).expect("valid secret");
        assert_eq!(format!("{secret:?}"), "JwtSecret(<redacted>)");
    }
}
