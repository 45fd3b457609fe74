//! Driving ports for the anime watch list.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{AnimeDraft, AnimeEntry, AnimeFilter, AnimeId, Error, UserId};

/// Mutations on a user's watch list.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnimeCommand: Send + Sync {
    /// Save a catalogue entry for `owner`.
    ///
    /// # Errors
    ///
    /// Returns invalid request for drafts that fail validation and conflict
    /// when the owner already saved the same catalogue identifier.
    async fn add_anime(&self, owner: &UserId, draft: AnimeDraft) -> Result<AnimeEntry, Error>;

    /// Remove an owned entry and its playlist references.
    ///
    /// # Errors
    ///
    /// Returns not found when the entry is missing or owned by another user.
    async fn remove_anime(&self, owner: &UserId, id: &AnimeId) -> Result<(), Error>;
}

/// Reads on a user's watch list.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnimeQuery: Send + Sync {
    /// One page of entries matching `filter`.
    async fn list_animes(
        &self,
        owner: &UserId,
        filter: AnimeFilter,
        page: PageRequest,
    ) -> Result<Page<AnimeEntry>, Error>;
}
