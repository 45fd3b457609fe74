//! Application configuration loaded via OrthoConfig.
//!
//! Values come from CLI flags, `ANIMELIST_*` environment variables and an
//! optional configuration file, in that order of precedence.

use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::Duration;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::outbound::token::{JwtSecret, JwtSecretError};

const DEFAULT_TOKEN_TTL_MINUTES: u32 = 24 * 60;

/// Errors raised while turning settings into runtime values.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The secret file could not be read.
    #[error("failed to read signing secret at {path}: {source}")]
    SecretFile {
        /// Configured secret path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The configured secret is unusable.
    #[error("invalid signing secret: {0}")]
    Secret(#[from] JwtSecretError),
    /// No secret configured and ephemeral secrets are not allowed.
    #[error(
        "no signing secret configured; set ANIMELIST_JWT_SECRET or ANIMELIST_JWT_SECRET_FILE, \
         or ANIMELIST_ALLOW_EPHEMERAL_SECRET=true for local runs"
    )]
    MissingSecret,
    /// The token lifetime must be positive.
    #[error("token lifetime must be at least one minute")]
    ZeroTokenTtl,
}

/// Runtime configuration for the API server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ANIMELIST")]
pub struct AppSettings {
    /// Socket address to listen on. Defaults to `0.0.0.0:8080`.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL connection URL. Without one the server keeps all data in
    /// memory.
    pub database_url: Option<String>,
    /// Maximum pooled database connections. Defaults to 10.
    pub db_max_connections: Option<u32>,
    /// Token signing secret, at least 32 bytes.
    pub jwt_secret: Option<String>,
    /// File holding the token signing secret.
    pub jwt_secret_file: Option<PathBuf>,
    /// Token lifetime in minutes. Defaults to 24 hours.
    pub token_ttl_minutes: Option<u32>,
    /// Permit a random per-process secret when none is configured.
    #[ortho_config(default = false)]
    pub allow_ephemeral_secret: bool,
}

impl AppSettings {
    /// Return the listen address, falling back to the default.
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8080)))
    }

    /// Return the configured database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Return the token lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::ZeroTokenTtl`] when configured as zero.
    pub fn token_ttl(&self) -> Result<Duration, SettingsError> {
        match self.token_ttl_minutes.unwrap_or(DEFAULT_TOKEN_TTL_MINUTES) {
            0 => Err(SettingsError::ZeroTokenTtl),
            minutes => Ok(Duration::minutes(i64::from(minutes))),
        }
    }

    /// Resolve the token signing secret.
    ///
    /// An inline secret wins over a secret file. Without either, debug builds
    /// and deployments that opt in with `allow_ephemeral_secret` get a random
    /// secret that dies with the process.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read, the secret is too short, or no
    /// secret is configured in a release build without the opt-in.
    pub fn jwt_secret(&self) -> Result<JwtSecret, SettingsError> {
        self.resolve_jwt_secret(cfg!(debug_assertions))
    }

    fn resolve_jwt_secret(&self, debug_build: bool) -> Result<JwtSecret, SettingsError> {
        if let Some(secret) = self.jwt_secret.as_deref() {
            return Ok(JwtSecret::from_bytes(secret.as_bytes())?);
        }
        if let Some(path) = self.jwt_secret_file.as_ref() {
            let bytes = std::fs::read(path).map_err(|source| SettingsError::SecretFile {
                path: path.clone(),
                source,
            })?;
            return Ok(JwtSecret::from_bytes(&bytes)?);
        }
        if debug_build || self.allow_ephemeral_secret {
            warn!("no signing secret configured; using an ephemeral secret (tokens die on restart)");
            return Ok(JwtSecret::ephemeral());
        }
        Err(SettingsError::MissingSecret)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for configuration parsing and secret resolution.

    use super::*;
    use std::ffi::OsString;
    use std::io::Write;

    use env_lock::lock_env;
    use rstest::{fixture, rstest};

    const ENV_KEYS: [&str; 7] = [
        "ANIMELIST_BIND_ADDR",
        "ANIMELIST_DATABASE_URL",
        "ANIMELIST_DB_MAX_CONNECTIONS",
        "ANIMELIST_JWT_SECRET",
        "ANIMELIST_JWT_SECRET_FILE",
        "ANIMELIST_TOKEN_TTL_MINUTES",
        "ANIMELIST_ALLOW_EPHEMERAL_SECRET",
    ];

    const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("animelist")]).expect("config should load")
    }

    #[fixture]
    fn blank() -> AppSettings {
        AppSettings {
            bind_addr: None,
            database_url: None,
            db_max_connections: None,
            jwt_secret: None,
            jwt_secret_file: None,
            token_ttl_minutes: None,
            allow_ephemeral_secret: false,
        }
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(ENV_KEYS.map(|key| (key, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr().to_string(), DEFAULT_BIND_ADDR);
        assert!(settings.database_url().is_none());
        assert!(settings.db_max_connections.is_none());
        assert_eq!(
            settings.token_ttl().expect("default ttl"),
            Duration::hours(24)
        );
        assert!(!settings.allow_ephemeral_secret);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("ANIMELIST_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            (
                "ANIMELIST_DATABASE_URL",
                Some("postgres://localhost/animelist".to_owned()),
            ),
            ("ANIMELIST_DB_MAX_CONNECTIONS", Some("4".to_owned())),
            ("ANIMELIST_JWT_SECRET", Some(SECRET.to_owned())),
            ("ANIMELIST_JWT_SECRET_FILE", None),
            ("ANIMELIST_TOKEN_TTL_MINUTES", Some("30".to_owned())),
            ("ANIMELIST_ALLOW_EPHEMERAL_SECRET", Some("true".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr().to_string(), "127.0.0.1:9000");
        assert_eq!(
            settings.database_url(),
            Some("postgres://localhost/animelist")
        );
        assert_eq!(settings.db_max_connections, Some(4));
        assert_eq!(settings.token_ttl().expect("ttl"), Duration::minutes(30));
        assert!(settings.allow_ephemeral_secret);
        assert!(settings.jwt_secret().is_ok());
    }

    #[rstest]
    fn blank_database_url_counts_as_absent(mut blank: AppSettings) {
        blank.database_url = Some("   ".into());
        assert!(blank.database_url().is_none());
    }

    #[rstest]
    fn zero_ttl_is_rejected(mut blank: AppSettings) {
        blank.token_ttl_minutes = Some(0);
        assert!(matches!(blank.token_ttl(), Err(SettingsError::ZeroTokenTtl)));
    }

    #[rstest]
    fn release_builds_require_a_secret(blank: AppSettings) {
        assert!(matches!(
            blank.resolve_jwt_secret(false),
            Err(SettingsError::MissingSecret)
        ));
        assert!(blank.resolve_jwt_secret(true).is_ok());
    }

    #[rstest]
    fn opt_in_allows_ephemeral_secret_in_release(mut blank: AppSettings) {
        blank.allow_ephemeral_secret = true;
        assert!(blank.resolve_jwt_secret(false).is_ok());
    }

    #[rstest]
    fn short_inline_secret_is_rejected(mut blank: AppSettings) {
        blank.jwt_secret = Some("too-short".into());
        assert!(matches!(
            blank.resolve_jwt_secret(true),
            Err(SettingsError::Secret(JwtSecretError::TooShort { .. }))
        ));
    }

    #[rstest]
    fn secret_file_is_read_and_trimmed(mut blank: AppSettings) {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "{SECRET}").expect("write secret");
        blank.jwt_secret_file = Some(file.path().to_path_buf());
        assert!(blank.resolve_jwt_secret(false).is_ok());
    }

    #[rstest]
    fn missing_secret_file_is_reported(mut blank: AppSettings) {
        blank.jwt_secret_file = Some(PathBuf::from("/nonexistent/animelist/secret"));
        assert!(matches!(
            blank.resolve_jwt_secret(false),
            Err(SettingsError::SecretFile { .. })
        ));
    }
}
