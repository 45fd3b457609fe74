//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint, the request and response
//! schemas, and the bearer token security scheme. Swagger UI serves it in
//! debug builds and `openapi-dump` prints it for external tooling.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::ports::AuthSession;
use crate::domain::{
    AccessToken, AnimeEntry, AnimeFormat, Error, ErrorCode, Playlist, Theme, User, WatchStatus,
};
use crate::inbound::http::MessageResponse;
use crate::inbound::http::account::{LoginRequest, RegisterRequest, UpdateUserRequest};
use crate::inbound::http::animes::{AnimeListResponse, CatalogId, CreateAnimeRequest};
use crate::inbound::http::playlists::{
    CreatePlaylistRequest, PlaylistListResponse, UpdatePlaylistRequest,
};

/// Name of the bearer security scheme referenced by protected operations.
pub const BEARER_SCHEME: &str = "BearerAuth";

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "Token returned by POST /api/v1/auth/register or /api/v1/auth/login.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Animelist API",
        description = "Personal anime watch-list: accounts, tracked anime and playlists."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::account::register,
        crate::inbound::http::account::login,
        crate::inbound::http::account::update_user,
        crate::inbound::http::account::delete_user,
        crate::inbound::http::animes::list_animes,
        crate::inbound::http::animes::create_anime,
        crate::inbound::http::animes::delete_anime,
        crate::inbound::http::playlists::list_playlists,
        crate::inbound::http::playlists::create_playlist,
        crate::inbound::http::playlists::get_playlist,
        crate::inbound::http::playlists::update_playlist,
        crate::inbound::http::playlists::delete_playlist,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        User,
        Theme,
        AccessToken,
        AuthSession,
        RegisterRequest,
        LoginRequest,
        UpdateUserRequest,
        AnimeEntry,
        AnimeFormat,
        WatchStatus,
        CatalogId,
        CreateAnimeRequest,
        AnimeListResponse,
        Playlist,
        CreatePlaylistRequest,
        UpdatePlaylistRequest,
        PlaylistListResponse,
        MessageResponse,
    )),
    tags(
        (name = "auth", description = "Registration, login and account management"),
        (name = "animes", description = "Tracked anime entries"),
        (name = "playlists", description = "Playlists of tracked anime"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
