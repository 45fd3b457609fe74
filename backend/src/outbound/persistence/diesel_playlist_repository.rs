//! PostgreSQL-backed `PlaylistRepository` implementation using Diesel ORM.
//!
//! Writes run in a transaction that first takes a `KEY SHARE` lock on the
//! owner row and a `SHARE` lock on every referenced anime entry. A concurrent
//! account deletion or anime removal therefore waits for the playlist write
//! to commit and then strips or cascades it, instead of leaving a dangling
//! reference behind.

use std::collections::HashSet;

use async_trait::async_trait;
use diesel::dsl::now;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{PlaylistRepository, PlaylistRepositoryError};
use crate::domain::{AnimeId, Playlist, PlaylistId, PlaylistTitle, UserId};

use super::diesel_helpers::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewPlaylistRow, PlaylistRow, PlaylistUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::{anime_entries, playlists, users};

/// Diesel-backed implementation of the [`PlaylistRepository`] port.
#[derive(Clone)]
pub struct DieselPlaylistRepository {
    pool: DbPool,
}

impl DieselPlaylistRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PlaylistRepositoryError {
    map_basic_pool_error(error, PlaylistRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> PlaylistRepositoryError {
    map_basic_diesel_error(
        error,
        PlaylistRepositoryError::query,
        PlaylistRepositoryError::connection,
    )
}

fn row_to_playlist(row: PlaylistRow) -> Result<Playlist, PlaylistRepositoryError> {
    let title = PlaylistTitle::new(&row.title).map_err(|err| {
        PlaylistRepositoryError::query(format!("stored playlist {} is invalid: {err}", row.id))
    })?;
    Ok(Playlist::new(
        PlaylistId::from_uuid(row.id),
        UserId::from_uuid(row.owner_id),
        title,
        row.anime_ids.into_iter().map(AnimeId::from_uuid).collect(),
        row.created_at,
    ))
}

fn anime_uuids(playlist: &Playlist) -> Vec<Uuid> {
    playlist
        .anime_ids()
        .iter()
        .map(|id| *id.as_uuid())
        .collect()
}

/// Lock the owner and the referenced entries, reporting whichever is
/// missing.
async fn lock_references(
    conn: &mut AsyncPgConnection,
    owner: Uuid,
    entries: &[Uuid],
) -> QueryResult<Option<PlaylistRepositoryError>> {
    let owner_row: Option<Uuid> = users::table
        .find(owner)
        .select(users::id)
        .for_key_share()
        .get_result(conn)
        .await
        .optional()?;
    if owner_row.is_none() {
        return Ok(Some(PlaylistRepositoryError::owner_missing(owner.to_string())));
    }
    if entries.is_empty() {
        return Ok(None);
    }
    let held: HashSet<Uuid> = anime_entries::table
        .filter(anime_entries::owner_id.eq(owner))
        .filter(anime_entries::id.eq_any(entries.to_vec()))
        .select(anime_entries::id)
        .for_share()
        .load::<Uuid>(conn)
        .await?
        .into_iter()
        .collect();
    let unknown: Vec<String> = entries
        .iter()
        .filter(|id| !held.contains(*id))
        .map(ToString::to_string)
        .collect();
    Ok((!unknown.is_empty()).then(|| PlaylistRepositoryError::unknown_anime(unknown)))
}

#[async_trait]
impl PlaylistRepository for DieselPlaylistRepository {
    async fn insert(&self, playlist: &Playlist) -> Result<(), PlaylistRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewPlaylistRow {
            id: *playlist.id().as_uuid(),
            owner_id: *playlist.owner().as_uuid(),
            title: playlist.title().as_ref(),
            anime_ids: anime_uuids(playlist),
            created_at: playlist.created_at(),
        };

        let refused = conn
            .transaction(|conn| {
                async move {
                    if let Some(refused) =
                        lock_references(conn, row.owner_id, &row.anime_ids).await?
                    {
                        return Ok(Some(refused));
                    }
                    diesel::insert_into(playlists::table)
                        .values(&row)
                        .execute(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>(None)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        refused.map_or(Ok(()), Err)
    }

    async fn list_for_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<Playlist>, PlaylistRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<PlaylistRow> = playlists::table
            .filter(playlists::owner_id.eq(owner.as_uuid()))
            .select(PlaylistRow::as_select())
            .order_by((playlists::created_at.asc(), playlists::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_playlist).collect()
    }

    async fn find_for_owner(
        &self,
        owner: &UserId,
        id: &PlaylistId,
    ) -> Result<Option<Playlist>, PlaylistRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<PlaylistRow> = playlists::table
            .filter(playlists::id.eq(id.as_uuid()))
            .filter(playlists::owner_id.eq(owner.as_uuid()))
            .select(PlaylistRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_playlist).transpose()
    }

    async fn update_for_owner(&self, playlist: &Playlist) -> Result<bool, PlaylistRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = *playlist.id().as_uuid();
        let owner = *playlist.owner().as_uuid();
        let changes = PlaylistUpdate {
            title: playlist.title().as_ref(),
            anime_ids: anime_uuids(playlist),
        };

        conn.transaction(|conn| {
            async move {
                let existing: Option<Uuid> = playlists::table
                    .filter(playlists::id.eq(id))
                    .filter(playlists::owner_id.eq(owner))
                    .select(playlists::id)
                    .for_update()
                    .get_result(conn)
                    .await
                    .optional()?;
                if existing.is_none() {
                    return Ok(Ok(false));
                }
                if let Some(refused) = lock_references(conn, owner, &changes.anime_ids).await? {
                    return Ok(Err(refused));
                }
                diesel::update(playlists::table.find(id))
                    .set((&changes, playlists::updated_at.eq(now)))
                    .execute(conn)
                    .await?;
                Ok::<_, diesel::result::Error>(Ok(true))
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)?
    }

    async fn delete_for_owner(
        &self,
        owner: &UserId,
        id: &PlaylistId,
    ) -> Result<bool, PlaylistRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            playlists::table
                .filter(playlists::id.eq(id.as_uuid()))
                .filter(playlists::owner_id.eq(owner.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
