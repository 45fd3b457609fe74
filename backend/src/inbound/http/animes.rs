//! Anime watch-list handlers.
//!
//! ```text
//! GET    /api/v1/animes?page=1&limit=10&status=all&animeType=tv&sort=a-z&search=bebop
//! POST   /api/v1/animes
//! DELETE /api/v1/animes/{id}
//! ```

use std::str::FromStr;

use actix_web::{HttpResponse, delete, get, post, web};
use pagination::{Page, PageRequest};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    AnimeDraft, AnimeEntry, AnimeFilter, AnimeFormat, AnimeId, AnimeSort, AnimeValidationError,
    AuthenticatedUser, Error, WatchStatus,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, field_error, parse_optional_date, parse_uuid,
};
use crate::inbound::http::{ApiResult, MessageResponse};

const ID: FieldName = FieldName::new("id");
const CREATION_DATE: FieldName = FieldName::new("creationDate");

/// Filter value meaning "no filter", as sent by list views.
const ALL: &str = "all";

/// Query parameters for `GET /api/v1/animes`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListAnimesQuery {
    /// 1-based page number (default 1).
    pub page: Option<u32>,
    /// Page size, 1 to 100 (default 10).
    pub limit: Option<u32>,
    /// Watch status filter, or `all`.
    pub status: Option<String>,
    /// Format filter (`tv`, `movie`, ...), or `all`.
    pub anime_type: Option<String>,
    /// `latest`, `oldest`, `a-z`, `z-a`, `rating`, `format` or `date added`.
    pub sort: Option<String>,
    /// Case-insensitive title substring.
    pub search: Option<String>,
}

fn optional_filter<T>(value: Option<&str>) -> Result<Option<T>, Error>
where
    T: FromStr<Err = AnimeValidationError>,
{
    value
        .map(str::trim)
        .filter(|raw| !raw.is_empty() && !raw.eq_ignore_ascii_case(ALL))
        .map(|raw| raw.parse::<T>().map_err(field_error))
        .transpose()
}

impl ListAnimesQuery {
    fn into_parts(self) -> Result<(AnimeFilter, PageRequest), Error> {
        let page = PageRequest::from_query(self.page, self.limit).map_err(field_error)?;
        let sort = match self.sort.as_deref().map(str::trim) {
            None | Some("") => AnimeSort::default(),
            Some(raw) => raw.parse::<AnimeSort>().map_err(field_error)?,
        };
        let filter = AnimeFilter {
            status: optional_filter::<WatchStatus>(self.status.as_deref())?,
            format: optional_filter::<AnimeFormat>(self.anime_type.as_deref())?,
            search: self.search,
            sort,
        };
        Ok((filter, page))
    }
}

/// One page of the caller's watch-list.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnimeListResponse {
    pub animes: Vec<AnimeEntry>,
    #[schema(example = 42)]
    pub total_animes: u64,
    #[schema(example = 5)]
    pub num_of_pages: u64,
}

impl From<Page<AnimeEntry>> for AnimeListResponse {
    fn from(page: Page<AnimeEntry>) -> Self {
        let total_animes = page.total();
        let num_of_pages = page.page_count();
        Self {
            animes: page.into_items(),
            total_animes,
            num_of_pages,
        }
    }
}

/// Catalogue identifiers arrive as strings or bare numbers.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
#[serde(untagged)]
pub enum CatalogId {
    Text(String),
    Number(u64),
}

impl Default for CatalogId {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl From<CatalogId> for String {
    fn from(value: CatalogId) -> Self {
        match value {
            CatalogId::Text(text) => text,
            CatalogId::Number(number) => number.to_string(),
        }
    }
}

/// Body for `POST /api/v1/animes`: a catalogue record snapshot.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnimeRequest {
    /// Catalogue identifier; `id` is accepted as an alias.
    #[serde(default, alias = "id")]
    pub catalog_id: CatalogId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    #[schema(example = 82.5)]
    pub rating: Option<f64>,
    #[serde(default)]
    #[schema(example = "tv")]
    pub format: Option<String>,
    #[serde(default)]
    pub episode_count: Option<i64>,
    #[serde(default)]
    pub synopsis: String,
    #[serde(default)]
    pub cover_image: String,
    /// `YYYY-MM-DD` or an RFC 3339 timestamp.
    #[serde(default)]
    pub creation_date: Option<String>,
    #[serde(default)]
    pub youtube_video_id: Option<String>,
    #[serde(default)]
    pub age_rating: Option<String>,
    #[serde(default)]
    #[schema(example = "planned")]
    pub status: Option<String>,
}

impl TryFrom<CreateAnimeRequest> for AnimeDraft {
    type Error = Error;

    fn try_from(value: CreateAnimeRequest) -> Result<Self, Self::Error> {
        let format = match value.format.as_deref().map(str::trim) {
            None | Some("") => AnimeFormat::Unknown,
            Some(raw) => raw.parse::<AnimeFormat>().map_err(field_error)?,
        };
        let status = match value.status.as_deref().map(str::trim) {
            None | Some("") => WatchStatus::default(),
            Some(raw) => raw.parse::<WatchStatus>().map_err(field_error)?,
        };
        Ok(Self {
            catalog_id: value.catalog_id.into(),
            title: value.title,
            rating: value.rating,
            format,
            episode_count: value.episode_count,
            synopsis: value.synopsis,
            cover_image: value.cover_image,
            creation_date: parse_optional_date(value.creation_date, CREATION_DATE)?,
            youtube_video_id: value.youtube_video_id,
            age_rating: value.age_rating,
            status,
        })
    }
}

/// List the caller's anime entries.
#[utoipa::path(
    get,
    path = "/api/v1/animes",
    params(ListAnimesQuery),
    responses(
        (status = 200, description = "Page of anime entries", body = AnimeListResponse),
        (status = 400, description = "Invalid query", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["animes"],
    operation_id = "listAnimes"
)]
#[get("/animes")]
pub async fn list_animes(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    query: web::Query<ListAnimesQuery>,
) -> ApiResult<web::Json<AnimeListResponse>> {
    let (filter, page) = query.into_inner().into_parts()?;
    let page = state
        .animes_query
        .list_animes(user.user_id(), filter, page)
        .await?;
    Ok(web::Json(page.into()))
}

/// Add an anime to the caller's watch-list.
#[utoipa::path(
    post,
    path = "/api/v1/animes",
    request_body = CreateAnimeRequest,
    responses(
        (status = 201, description = "Anime added", body = AnimeEntry),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 409, description = "Already in the watch-list", body = Error)
    ),
    tags = ["animes"],
    operation_id = "createAnime"
)]
#[post("/animes")]
pub async fn create_anime(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<CreateAnimeRequest>,
) -> ApiResult<HttpResponse> {
    let draft = AnimeDraft::try_from(payload.into_inner())?;
    let entry = state.animes.add_anime(user.user_id(), draft).await?;
    Ok(HttpResponse::Created().json(entry))
}

/// Remove an anime from the caller's watch-list and from their playlists.
#[utoipa::path(
    delete,
    path = "/api/v1/animes/{id}",
    params(("id" = String, Path, description = "Anime entry identifier")),
    responses(
        (status = 200, description = "Anime removed", body = MessageResponse),
        (status = 400, description = "Malformed identifier", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "No such anime in the caller's list", body = Error)
    ),
    tags = ["animes"],
    operation_id = "deleteAnime"
)]
#[delete("/animes/{id}")]
pub async fn delete_anime(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageResponse>> {
    let id = AnimeId::from_uuid(parse_uuid(&path.into_inner(), ID)?);
    state.animes.remove_anime(user.user_id(), &id).await?;
    Ok(web::Json(MessageResponse::new("Anime deleted")))
}
