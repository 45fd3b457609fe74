//! Builders wiring repositories into the services behind [`HttpState`].

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use animelist::domain::ports::{AnimeRepository, PlaylistRepository, UserRepository};
use animelist::domain::{AccountService, AnimeService, PlaylistService};
use animelist::inbound::http::state::HttpState;
use animelist::outbound::memory::InMemoryStore;
use animelist::outbound::password::Argon2PasswordHasher;
use animelist::outbound::persistence::{
    DieselAnimeRepository, DieselPlaylistRepository, DieselUserRepository,
};
use animelist::outbound::token::JwtTokenService;

use super::ServerConfig;

/// Assemble the domain services over one set of repositories.
fn assemble<U, A, P>(
    users: Arc<U>,
    animes: Arc<A>,
    playlists: Arc<P>,
    tokens: Arc<JwtTokenService>,
) -> HttpState
where
    U: UserRepository + 'static,
    A: AnimeRepository + 'static,
    P: PlaylistRepository + 'static,
{
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let accounts = AccountService::new(users, Arc::new(Argon2PasswordHasher::new()), tokens);
    let anime_service = Arc::new(AnimeService::new(animes, Arc::clone(&clock)));
    let playlist_service = Arc::new(PlaylistService::new(playlists, clock));
    HttpState {
        accounts: Arc::new(accounts),
        animes: anime_service.clone(),
        animes_query: anime_service,
        playlists: playlist_service.clone(),
        playlists_query: playlist_service,
    }
}

/// Build handler state, backed by PostgreSQL when a pool is configured and
/// by a process-local store otherwise.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let tokens = Arc::clone(&config.tokens);
    let state = match &config.db_pool {
        Some(pool) => {
            info!("using PostgreSQL repositories");
            assemble(
                Arc::new(DieselUserRepository::new(pool.clone())),
                Arc::new(DieselAnimeRepository::new(pool.clone())),
                Arc::new(DieselPlaylistRepository::new(pool.clone())),
                tokens,
            )
        }
        None => {
            warn!("no database configured; data lives in memory and is lost on restart");
            let store = Arc::new(InMemoryStore::new());
            assemble(Arc::clone(&store), Arc::clone(&store), store, tokens)
        }
    };
    web::Data::new(state)
}
