//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use animelist::outbound::persistence::DbPool;
use animelist::outbound::token::JwtTokenService;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) tokens: Arc<JwtTokenService>,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Construct a server configuration that keeps data in memory.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, tokens: Arc<JwtTokenService>) -> Self {
        Self {
            bind_addr,
            tokens,
            db_pool: None,
        }
    }

    /// Attach a database connection pool.
    ///
    /// When provided, the server uses the Diesel repositories instead of the
    /// in-memory store.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
