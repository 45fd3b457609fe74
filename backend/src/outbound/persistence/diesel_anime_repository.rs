//! PostgreSQL-backed `AnimeRepository` implementation using Diesel ORM.
//!
//! Listing builds the same filtered query twice (count and page) and orders
//! with an identifier tie-break so page boundaries are stable.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::{Array, Text, Uuid as SqlUuid};
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::ports::{AnimeRepository, AnimeRepositoryError};
use crate::domain::{AnimeDraft, AnimeEntry, AnimeFilter, AnimeId, AnimeSort, UserId};

use super::diesel_helpers::{
    cast_count, cast_for_sql, contains_pattern, is_foreign_key_violation, is_unique_violation,
    map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{AnimeRow, NewAnimeRow};
use super::pool::{DbPool, PoolError};
use super::schema::{anime_entries, playlists};

const OWNER_CATALOG_CONSTRAINT: &str = "anime_entries_owner_catalog_key";

diesel::define_sql_function! {
    /// PostgreSQL `lower(text)`.
    fn lower(value: Text) -> Text;
}

diesel::define_sql_function! {
    /// PostgreSQL `array_remove(anyarray, anyelement)` specialised to UUIDs.
    fn array_remove(array: Array<SqlUuid>, element: SqlUuid) -> Array<SqlUuid>;
}

type BoxedAnimeQuery<'a> = anime_entries::BoxedQuery<'a, Pg>;

/// Diesel-backed implementation of the [`AnimeRepository`] port.
#[derive(Clone)]
pub struct DieselAnimeRepository {
    pool: DbPool,
}

impl DieselAnimeRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AnimeRepositoryError {
    map_basic_pool_error(error, AnimeRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> AnimeRepositoryError {
    map_basic_diesel_error(
        error,
        AnimeRepositoryError::query,
        AnimeRepositoryError::connection,
    )
}

fn row_to_entry(row: AnimeRow) -> Result<AnimeEntry, AnimeRepositoryError> {
    let id = row.id;
    let invalid = |reason: String| {
        AnimeRepositoryError::query(format!("stored anime {id} is invalid: {reason}"))
    };
    let draft = AnimeDraft {
        catalog_id: row.catalog_id,
        title: row.title,
        rating: row.rating,
        format: row.format.parse().map_err(|err| invalid(format!("{err}")))?,
        episode_count: row.episode_count.map(i64::from),
        synopsis: row.synopsis,
        cover_image: row.cover_image,
        creation_date: row.creation_date,
        youtube_video_id: row.youtube_video_id,
        age_rating: row.age_rating,
        status: row.status.parse().map_err(|err| invalid(format!("{err}")))?,
    };
    AnimeEntry::new(
        AnimeId::from_uuid(row.id),
        UserId::from_uuid(row.owner_id),
        draft,
        row.added_at,
    )
    .map_err(|err| invalid(err.to_string()))
}

/// Owner, status, format and search predicates shared by count and page
/// queries.
fn filtered<'a>(owner: Uuid, filter: &'a AnimeFilter) -> BoxedAnimeQuery<'a> {
    let mut query = anime_entries::table
        .filter(anime_entries::owner_id.eq(owner))
        .into_boxed();
    if let Some(status) = filter.status {
        query = query.filter(anime_entries::status.eq(status.as_str()));
    }
    if let Some(format) = filter.format {
        query = query.filter(anime_entries::format.eq(format.as_str()));
    }
    if let Some(term) = filter.search_term() {
        query = query.filter(anime_entries::title.ilike(contains_pattern(term)));
    }
    query
}

fn ordered(query: BoxedAnimeQuery<'_>, sort: AnimeSort) -> BoxedAnimeQuery<'_> {
    let query = match sort {
        AnimeSort::Latest => query.order_by(anime_entries::creation_date.desc().nulls_last()),
        AnimeSort::Oldest => query.order_by(anime_entries::creation_date.asc().nulls_last()),
        AnimeSort::TitleAsc => query.order_by(lower(anime_entries::title).asc()),
        AnimeSort::TitleDesc => query.order_by(lower(anime_entries::title).desc()),
        AnimeSort::Rating => query.order_by(anime_entries::rating.desc().nulls_last()),
        AnimeSort::Format => query
            .order_by(anime_entries::format.asc())
            .then_order_by(lower(anime_entries::title).asc()),
        AnimeSort::DateAdded => query.order_by(anime_entries::added_at.desc()),
    };
    query.then_order_by(anime_entries::id.asc())
}

#[async_trait]
impl AnimeRepository for DieselAnimeRepository {
    async fn insert(&self, entry: &AnimeEntry) -> Result<(), AnimeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewAnimeRow {
            id: *entry.id().as_uuid(),
            owner_id: *entry.owner().as_uuid(),
            catalog_id: entry.catalog_id(),
            title: entry.title(),
            rating: entry.rating(),
            format: entry.format().as_str(),
            episode_count: entry
                .episode_count()
                .map(|count| i32::try_from(count).unwrap_or(i32::MAX)),
            synopsis: entry.synopsis(),
            cover_image: entry.cover_image(),
            creation_date: entry.creation_date(),
            youtube_video_id: entry.youtube_video_id(),
            age_rating: entry.age_rating(),
            status: entry.status().as_str(),
            added_at: entry.added_at(),
        };

        diesel::insert_into(anime_entries::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| {
                if is_unique_violation(&err, OWNER_CATALOG_CONSTRAINT) {
                    AnimeRepositoryError::duplicate(entry.catalog_id())
                } else if is_foreign_key_violation(&err) {
                    AnimeRepositoryError::owner_missing(entry.owner().to_string())
                } else {
                    map_diesel_error(err)
                }
            })
    }

    async fn list_for_owner(
        &self,
        owner: &UserId,
        filter: &AnimeFilter,
        page: PageRequest,
    ) -> Result<Page<AnimeEntry>, AnimeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let owner = *owner.as_uuid();

        let total: i64 = filtered(owner, filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let rows: Vec<AnimeRow> = ordered(filtered(owner, filter), filter.sort)
            .select(AnimeRow::as_select())
            .offset(cast_for_sql(page.offset()))
            .limit(i64::from(page.limit()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(row_to_entry)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, cast_count(total), page))
    }

    async fn delete_for_owner(
        &self,
        owner: &UserId,
        id: &AnimeId,
    ) -> Result<bool, AnimeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let owner = *owner.as_uuid();
        let id = *id.as_uuid();

        conn.transaction(|conn| {
            async move {
                let removed = diesel::delete(
                    anime_entries::table
                        .filter(anime_entries::id.eq(id))
                        .filter(anime_entries::owner_id.eq(owner)),
                )
                .execute(conn)
                .await?;
                if removed == 0 {
                    return Ok(false);
                }
                diesel::update(
                    playlists::table
                        .filter(playlists::owner_id.eq(owner))
                        .filter(playlists::anime_ids.contains(vec![id])),
                )
                .set(playlists::anime_ids.eq(array_remove(playlists::anime_ids, id)))
                .execute(conn)
                .await?;
                Ok::<_, diesel::result::Error>(true)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}
