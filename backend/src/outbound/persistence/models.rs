//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain aggregates live
//! beside each repository.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{anime_entries, playlists, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub theme: String,
    pub is_demo: bool,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub theme: &'a str,
    pub is_demo: bool,
}

/// Changeset for profile edits. `updated_at` is set to the database `now`.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserProfileUpdate<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub theme: &'a str,
}

// ---------------------------------------------------------------------------
// Anime entry models
// ---------------------------------------------------------------------------

/// Row struct for reading from the anime_entries table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = anime_entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AnimeRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub catalog_id: String,
    pub title: String,
    pub rating: Option<f64>,
    pub format: String,
    pub episode_count: Option<i32>,
    pub synopsis: String,
    pub cover_image: String,
    pub creation_date: Option<NaiveDate>,
    pub youtube_video_id: Option<String>,
    pub age_rating: Option<String>,
    pub status: String,
    pub added_at: DateTime<Utc>,
}

/// Insertable struct for new anime entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = anime_entries)]
pub(crate) struct NewAnimeRow<'a> {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub catalog_id: &'a str,
    pub title: &'a str,
    pub rating: Option<f64>,
    pub format: &'a str,
    pub episode_count: Option<i32>,
    pub synopsis: &'a str,
    pub cover_image: &'a str,
    pub creation_date: Option<NaiveDate>,
    pub youtube_video_id: Option<&'a str>,
    pub age_rating: Option<&'a str>,
    pub status: &'a str,
    pub added_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Playlist models
// ---------------------------------------------------------------------------

/// Row struct for reading from the playlists table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = playlists)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PlaylistRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub anime_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for new playlists.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = playlists)]
pub(crate) struct NewPlaylistRow<'a> {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: &'a str,
    pub anime_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Changeset replacing the mutable playlist columns. `updated_at` is set to
/// the database `now`.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = playlists)]
pub(crate) struct PlaylistUpdate<'a> {
    pub title: &'a str,
    pub anime_ids: Vec<Uuid>,
}
