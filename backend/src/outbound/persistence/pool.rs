//! bb8 pool of `diesel-async` PostgreSQL connections.
//!
//! [`PoolConfig`] is derived from [`AppSettings`]: no `database_url` means no
//! pool (the server then runs on the in-memory store), and the pool size
//! comes from `db_max_connections`.

use std::fmt;
use std::num::NonZeroU32;
use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use tracing::info;

use crate::settings::AppSettings;

/// Pool size used when `db_max_connections` is not configured.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// How long a request waits for a free connection before failing with 503.
const CHECKOUT_TIMEOUT: Duration = Duration::from_secs(5);

/// Failures building or using the pool.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// `db_max_connections` was configured as zero.
    #[error("db_max_connections must be at least 1")]
    ZeroConnections,
    /// The pool could not open its connections.
    #[error("could not connect to PostgreSQL: {message}")]
    Connect {
        /// Driver message.
        message: String,
    },
    /// No connection became free within the checkout timeout.
    #[error("no database connection available: {message}")]
    Checkout {
        /// Driver message.
        message: String,
    },
}

/// Validated pool settings.
///
/// # Examples
/// ```
/// use animelist::outbound::persistence::PoolConfig;
/// use animelist::settings::AppSettings;
///
/// let settings = AppSettings {
///     bind_addr: None,
///     database_url: Some("postgres://animelist@localhost/animelist".into()),
///     db_max_connections: Some(4),
///     jwt_secret: None,
///     jwt_secret_file: None,
///     token_ttl_minutes: None,
///     allow_ephemeral_secret: false,
/// };
/// let config = PoolConfig::from_settings(&settings).unwrap().unwrap();
/// assert_eq!(config.max_connections(), 4);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct PoolConfig {
    database_url: String,
    max_connections: NonZeroU32,
}

impl PoolConfig {
    /// Derive pool settings, or `None` when no database is configured.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::ZeroConnections`] when `db_max_connections` is 0.
    pub fn from_settings(settings: &AppSettings) -> Result<Option<Self>, PoolError> {
        let Some(database_url) = settings.database_url() else {
            return Ok(None);
        };
        let configured = settings
            .db_max_connections
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);
        let max_connections = NonZeroU32::new(configured).ok_or(PoolError::ZeroConnections)?;
        Ok(Some(Self {
            database_url: database_url.to_owned(),
            max_connections,
        }))
    }

    /// Connection URL, also used by the migration runner.
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Upper bound on open connections.
    pub fn max_connections(&self) -> u32 {
        self.max_connections.get()
    }
}

impl fmt::Debug for PoolConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolConfig")
            .field("database_url", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

/// Shared handle to the connection pool. Clones share the same connections.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Open the pool described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Connect`] when PostgreSQL is unreachable or the
    /// URL is rejected.
    pub async fn connect(config: &PoolConfig) -> Result<Self, PoolError> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.database_url());
        let inner = Pool::builder()
            .max_size(config.max_connections())
            .connection_timeout(CHECKOUT_TIMEOUT)
            .build(manager)
            .await
            .map_err(|err| PoolError::Connect {
                message: err.to_string(),
            })?;
        info!(max_connections = config.max_connections(), "database pool ready");
        Ok(Self { inner })
    }

    /// Check out a connection for one repository call.
    pub(crate) async fn get(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.inner.get().await.map_err(|err| PoolError::Checkout {
            message: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    //! Settings-to-pool derivation.
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn settings() -> AppSettings {
        AppSettings {
            bind_addr: None,
            database_url: Some("postgres://ada:hunter22@db/animelist".into()),
            db_max_connections: None,
            jwt_secret: None,
            jwt_secret_file: None,
            token_ttl_minutes: None,
            allow_ephemeral_secret: false,
        }
    }

    #[rstest]
    fn no_database_url_means_no_pool(mut settings: AppSettings) {
        settings.database_url = Some("  ".into());
        assert_eq!(PoolConfig::from_settings(&settings), Ok(None));
    }

    #[rstest]
    #[case(None, DEFAULT_MAX_CONNECTIONS)]
    #[case(Some(3), 3)]
    fn pool_size_follows_settings(
        mut settings: AppSettings,
        #[case] configured: Option<u32>,
        #[case] expected: u32,
    ) {
        settings.db_max_connections = configured;
        let config = PoolConfig::from_settings(&settings)
            .expect("valid settings")
            .expect("database configured");
        assert_eq!(config.max_connections(), expected);
        assert_eq!(config.database_url(), "postgres://ada:hunter22@db/animelist");
    }

    #[rstest]
    fn zero_connections_are_rejected(mut settings: AppSettings) {
        settings.db_max_connections = Some(0);
        assert_eq!(
            PoolConfig::from_settings(&settings),
            Err(PoolError::ZeroConnections)
        );
    }

    #[rstest]
    fn debug_output_hides_credentials(settings: AppSettings) {
        let config = PoolConfig::from_settings(&settings)
            .expect("valid settings")
            .expect("database configured");
        assert!(!format!("{config:?}").contains("hunter22"));
    }
}
