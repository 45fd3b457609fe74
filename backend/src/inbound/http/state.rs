//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on driving ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AccountCommand, AnimeCommand, AnimeQuery, PlaylistCommand, PlaylistQuery,
};

/// Dependency bundle for HTTP handlers.
///
/// # Examples
/// ```no_run
/// use std::sync::Arc;
///
/// use animelist::domain::{AccountService, AnimeService, PlaylistService};
/// use animelist::inbound::http::state::HttpState;
/// use animelist::outbound::memory::InMemoryStore;
/// use animelist::outbound::password::Argon2PasswordHasher;
/// use animelist::outbound::token::{JwtSecret, JwtTokenService};
/// use mockable::DefaultClock;
///
/// let store = Arc::new(InMemoryStore::new());
/// let tokens = Arc::new(JwtTokenService::new(
///     &JwtSecret::ephemeral(),
///     chrono::Duration::hours(24),
///     Arc::new(DefaultClock),
/// ));
/// let animes = Arc::new(AnimeService::new(Arc::clone(&store), Arc::new(DefaultClock)));
/// let playlists = Arc::new(PlaylistService::new(Arc::clone(&store), Arc::new(DefaultClock)));
/// let state = HttpState {
///     accounts: Arc::new(AccountService::new(
///         Arc::clone(&store),
///         Arc::new(Argon2PasswordHasher::new()),
///         tokens,
///     )),
///     animes: animes.clone(),
///     animes_query: animes,
///     playlists: playlists.clone(),
///     playlists_query: playlists,
/// };
/// let _accounts = state.accounts.clone();
/// ```
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountCommand>,
    pub animes: Arc<dyn AnimeCommand>,
    pub animes_query: Arc<dyn AnimeQuery>,
    pub playlists: Arc<dyn PlaylistCommand>,
    pub playlists_query: Arc<dyn PlaylistQuery>,
}
