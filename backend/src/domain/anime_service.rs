//! Watch-list service implementing [`AnimeCommand`] and [`AnimeQuery`].

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};
use serde_json::json;

use crate::domain::ports::{AnimeCommand, AnimeQuery, AnimeRepository, AnimeRepositoryError};
use crate::domain::{
    AnimeDraft, AnimeEntry, AnimeFilter, AnimeId, AnimeValidationError, Error, UserId,
};

fn map_repository_error(error: AnimeRepositoryError) -> Error {
    match error {
        AnimeRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("anime repository unavailable: {message}"))
        }
        AnimeRepositoryError::Query { message } => {
            Error::internal(format!("anime repository error: {message}"))
        }
        AnimeRepositoryError::Duplicate { catalog_id } => {
            Error::conflict("anime already in your list").with_details(json!({
                "field": "catalogId",
                "code": "duplicate_anime",
                "catalogId": catalog_id,
            }))
        }
        AnimeRepositoryError::OwnerMissing { .. } => Error::unauthorized("account no longer exists")
            .with_details(json!({ "code": "account_missing" })),
    }
}

fn map_validation_error(error: AnimeValidationError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({
        "field": error.field(),
        "code": error.code(),
    }))
}

/// Watch-list service backed by an [`AnimeRepository`].
#[derive(Clone)]
pub struct AnimeService<A> {
    animes: Arc<A>,
    clock: Arc<dyn Clock>,
}

impl<A> AnimeService<A> {
    /// Create a new service stamping `addedAt` from `clock`.
    pub fn new(animes: Arc<A>, clock: Arc<dyn Clock>) -> Self {
        Self { animes, clock }
    }
}

#[async_trait]
impl<A> AnimeCommand for AnimeService<A>
where
    A: AnimeRepository,
{
    async fn add_anime(&self, owner: &UserId, draft: AnimeDraft) -> Result<AnimeEntry, Error> {
        let entry = AnimeEntry::new(AnimeId::random(), *owner, draft, self.clock.utc())
            .map_err(map_validation_error)?;
        self.animes
            .insert(&entry)
            .await
            .map_err(map_repository_error)?;
        Ok(entry)
    }

    async fn remove_anime(&self, owner: &UserId, id: &AnimeId) -> Result<(), Error> {
        let removed = self
            .animes
            .delete_for_owner(owner, id)
            .await
            .map_err(map_repository_error)?;
        if removed {
            Ok(())
        } else {
            Err(Error::not_found(format!("no anime with id {id}")))
        }
    }
}

#[async_trait]
impl<A> AnimeQuery for AnimeService<A>
where
    A: AnimeRepository,
{
    async fn list_animes(
        &self,
        owner: &UserId,
        filter: AnimeFilter,
        page: PageRequest,
    ) -> Result<Page<AnimeEntry>, Error> {
        self.animes
            .list_for_owner(owner, &filter, page)
            .await
            .map_err(map_repository_error)
    }
}

#[cfg(test)]
#[path = "anime_service_tests.rs"]
mod tests;
