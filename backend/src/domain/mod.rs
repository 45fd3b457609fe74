//! Domain primitives, aggregates, and services.
//!
//! Purpose: Define strongly typed domain entities used by the API and
//! persistence layers, plus the services implementing the driving ports.
//! Keep types immutable and document invariants and serialisation contracts
//! (serde) in each type's Rustdoc.
//!
//! Public surface:
//! - Error (alias to `error::Error`) — API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`) — stable error identifier.
//! - User, AnimeEntry, Playlist — the owned aggregates.
//! - AccountService, AnimeService, PlaylistService — use-case services.

pub mod anime;
pub mod auth;
pub mod error;
pub mod playlist;
pub mod ports;
pub mod trace_id;
pub mod user;

mod account_service;
mod anime_service;
mod playlist_service;

pub use self::account_service::AccountService;
pub use self::anime::{
    ANIME_TITLE_MAX, AnimeDraft, AnimeEntry, AnimeFilter, AnimeFormat, AnimeId, AnimeSort,
    AnimeValidationError, CATALOG_ID_MAX, RATING_MAX, WatchStatus,
};
pub use self::anime_service::AnimeService;
pub use self::auth::{
    AccessToken, AuthenticatedUser, CredentialValidationError, LoginCredentials, PASSWORD_MIN,
    PasswordHash, ProfileUpdate, Registration, StoredCredentials,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::playlist::{
    PLAYLIST_ENTRIES_MAX, PLAYLIST_TITLE_MAX, Playlist, PlaylistId, PlaylistTitle,
    PlaylistValidationError, dedupe_anime_ids, validate_anime_ids,
};
pub use self::playlist_service::PlaylistService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{EmailAddress, Theme, User, UserId, UserName, UserValidationError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use animelist::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::unauthorized("missing bearer token"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
