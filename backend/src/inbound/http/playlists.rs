//! Playlist handlers.
//!
//! ```text
//! GET    /api/v1/playlists
//! POST   /api/v1/playlists        {"title":"Weekend binge","animeIds":["..."]}
//! GET    /api/v1/playlists/{id}
//! PATCH  /api/v1/playlists/{id}   {"title":"Renamed"}
//! DELETE /api/v1/playlists/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{NewPlaylist, PlaylistChanges};
use crate::domain::{AnimeId, AuthenticatedUser, Error, Playlist, PlaylistId, PlaylistTitle};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, field_error, parse_uuid, parse_uuid_list};
use crate::inbound::http::{ApiResult, MessageResponse};

const ID: FieldName = FieldName::new("id");
const ANIME_IDS: FieldName = FieldName::new("animeIds");

fn parse_playlist_id(raw: &str) -> Result<PlaylistId, Error> {
    parse_uuid(raw, ID).map(PlaylistId::from_uuid)
}

fn parse_anime_ids(raw: Vec<String>) -> Result<Vec<AnimeId>, Error> {
    parse_uuid_list(raw, ANIME_IDS)
        .map(|ids| ids.into_iter().map(AnimeId::from_uuid).collect())
}

/// Body for `POST /api/v1/playlists`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlaylistRequest {
    #[serde(default)]
    #[schema(example = "Weekend binge")]
    pub title: String,
    /// Entries from the caller's watch-list, in display order.
    #[serde(default)]
    pub anime_ids: Vec<String>,
}

impl TryFrom<CreatePlaylistRequest> for NewPlaylist {
    type Error = Error;

    fn try_from(value: CreatePlaylistRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            title: PlaylistTitle::new(&value.title).map_err(field_error)?,
            anime_ids: parse_anime_ids(value.anime_ids)?,
        })
    }
}

/// Body for `PATCH /api/v1/playlists/{id}`. Absent fields stay unchanged;
/// `animeIds` replaces the whole entry list.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlaylistRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub anime_ids: Option<Vec<String>>,
}

impl TryFrom<UpdatePlaylistRequest> for PlaylistChanges {
    type Error = Error;

    fn try_from(value: UpdatePlaylistRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            title: value
                .title
                .map(|title| PlaylistTitle::new(&title).map_err(field_error))
                .transpose()?,
            anime_ids: value.anime_ids.map(parse_anime_ids).transpose()?,
        })
    }
}

/// Every playlist the caller owns, oldest first.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlaylistListResponse {
    pub playlists: Vec<Playlist>,
}

/// List the caller's playlists.
#[utoipa::path(
    get,
    path = "/api/v1/playlists",
    responses(
        (status = 200, description = "Playlists", body = PlaylistListResponse),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["playlists"],
    operation_id = "listPlaylists"
)]
#[get("/playlists")]
pub async fn list_playlists(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<PlaylistListResponse>> {
    let playlists = state.playlists_query.list_playlists(user.user_id()).await?;
    Ok(web::Json(PlaylistListResponse { playlists }))
}

/// Create a playlist.
#[utoipa::path(
    post,
    path = "/api/v1/playlists",
    request_body = CreatePlaylistRequest,
    responses(
        (status = 201, description = "Playlist created", body = Playlist),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Unknown anime referenced", body = Error)
    ),
    tags = ["playlists"],
    operation_id = "createPlaylist"
)]
#[post("/playlists")]
pub async fn create_playlist(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<CreatePlaylistRequest>,
) -> ApiResult<HttpResponse> {
    let playlist = NewPlaylist::try_from(payload.into_inner())?;
    let created = state
        .playlists
        .create_playlist(user.user_id(), playlist)
        .await?;
    Ok(HttpResponse::Created().json(created))
}

/// Fetch one of the caller's playlists.
#[utoipa::path(
    get,
    path = "/api/v1/playlists/{id}",
    params(("id" = String, Path, description = "Playlist identifier")),
    responses(
        (status = 200, description = "Playlist", body = Playlist),
        (status = 400, description = "Malformed identifier", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["playlists"],
    operation_id = "getPlaylist"
)]
#[get("/playlists/{id}")]
pub async fn get_playlist(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<Playlist>> {
    let id = parse_playlist_id(&path.into_inner())?;
    let playlist = state
        .playlists_query
        .get_playlist(user.user_id(), &id)
        .await?;
    Ok(web::Json(playlist))
}

/// Rename a playlist or replace its entries.
#[utoipa::path(
    patch,
    path = "/api/v1/playlists/{id}",
    params(("id" = String, Path, description = "Playlist identifier")),
    request_body = UpdatePlaylistRequest,
    responses(
        (status = 200, description = "Updated playlist", body = Playlist),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Playlist or referenced anime not found", body = Error)
    ),
    tags = ["playlists"],
    operation_id = "updatePlaylist"
)]
#[patch("/playlists/{id}")]
pub async fn update_playlist(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<UpdatePlaylistRequest>,
) -> ApiResult<web::Json<Playlist>> {
    let id = parse_playlist_id(&path.into_inner())?;
    let changes = PlaylistChanges::try_from(payload.into_inner())?;
    let playlist = state
        .playlists
        .update_playlist(user.user_id(), &id, changes)
        .await?;
    Ok(web::Json(playlist))
}

/// Delete a playlist. Its anime entries are kept.
#[utoipa::path(
    delete,
    path = "/api/v1/playlists/{id}",
    params(("id" = String, Path, description = "Playlist identifier")),
    responses(
        (status = 200, description = "Playlist deleted", body = MessageResponse),
        (status = 400, description = "Malformed identifier", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["playlists"],
    operation_id = "deletePlaylist"
)]
#[delete("/playlists/{id}")]
pub async fn delete_playlist(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageResponse>> {
    let id = parse_playlist_id(&path.into_inner())?;
    state.playlists.delete_playlist(user.user_id(), &id).await?;
    Ok(web::Json(MessageResponse::new("Playlist deleted")))
}

#[cfg(test)]
mod tests;
