//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpMessage, web};
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::ports::{
    MockAccountCommand, MockAnimeCommand, MockAnimeQuery, MockPlaylistCommand, MockPlaylistQuery,
};
use crate::domain::{AuthenticatedUser, UserId};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{json_error_handler, query_error_handler};

/// Mocked driving ports. Unused mocks panic if called.
#[derive(Default)]
pub struct MockPorts {
    pub accounts: MockAccountCommand,
    pub animes: MockAnimeCommand,
    pub animes_query: MockAnimeQuery,
    pub playlists: MockPlaylistCommand,
    pub playlists_query: MockPlaylistQuery,
}

impl MockPorts {
    /// Wrap the mocks as handler state.
    pub fn into_state(self) -> web::Data<HttpState> {
        web::Data::new(HttpState {
            accounts: Arc::new(self.accounts),
            animes: Arc::new(self.animes),
            animes_query: Arc::new(self.animes_query),
            playlists: Arc::new(self.playlists),
            playlists_query: Arc::new(self.playlists_query),
        })
    }
}

/// Fixed identity used by handler tests.
pub fn caller() -> UserId {
    UserId::from_uuid(Uuid::from_u128(0xA11CE))
}

/// Attach `user` as if the bearer gate had verified a token.
pub fn authenticated(req: &ServiceRequest, user: UserId) {
    req.extensions_mut()
        .insert(AuthenticatedUser::new(user, Utc::now() + Duration::hours(1)));
}

/// Build an app with the production extractor configuration and `routes`,
/// where every request is treated as coming from [`caller`].
pub fn handler_app<F>(
    state: web::Data<HttpState>,
    routes: F,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    F: FnOnce(&mut web::ServiceConfig),
{
    App::new()
        .app_data(state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .wrap_fn(|req, srv| {
            authenticated(&req, caller());
            actix_web::dev::Service::call(srv, req)
        })
        .service(web::scope("/api/v1").configure(routes))
}
