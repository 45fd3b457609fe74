//! HTTP inbound adapter exposing REST endpoints under `/api/v1`.

pub mod account;
pub mod animes;
pub mod auth;
pub mod error;
pub mod health;
pub mod playlists;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

use actix_web::web;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::middleware::BearerAuth;

pub use error::ApiResult;

/// Plain acknowledgement body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "User deleted")]
    pub message: String,
}

impl MessageResponse {
    /// Wrap an acknowledgement message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Register the `/api/v1` scope.
///
/// Registration and login are public; every other route sits behind `gate`.
/// Malformed JSON bodies and query strings surface as `invalid_request`.
///
/// # Examples
/// ```no_run
/// use std::sync::Arc;
///
/// use actix_web::App;
/// use animelist::inbound::http::api_routes;
/// use animelist::middleware::BearerAuth;
/// use animelist::outbound::token::{JwtSecret, JwtTokenService};
/// use mockable::DefaultClock;
///
/// let tokens = JwtTokenService::new(
///     &JwtSecret::ephemeral(),
///     chrono::Duration::hours(24),
///     Arc::new(DefaultClock),
/// );
/// let gate = BearerAuth::new(Arc::new(tokens));
/// let app = App::new().configure(|cfg| api_routes(cfg, gate));
/// ```
pub fn api_routes(cfg: &mut web::ServiceConfig, gate: BearerAuth) {
    cfg.app_data(web::JsonConfig::default().error_handler(validation::json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(validation::query_error_handler))
        .service(
            web::scope("/api/v1")
                .service(account::register)
                .service(account::login)
                .service(
                    web::scope("")
                        .wrap(gate)
                        .service(account::update_user)
                        .service(account::delete_user)
                        .service(animes::list_animes)
                        .service(animes::create_anime)
                        .service(animes::delete_anime)
                        .service(playlists::list_playlists)
                        .service(playlists::create_playlist)
                        .service(playlists::get_playlist)
                        .service(playlists::update_playlist)
                        .service(playlists::delete_playlist),
                ),
        );
}
