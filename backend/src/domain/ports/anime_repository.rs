//! Port for owner-scoped anime entry persistence.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{AnimeEntry, AnimeFilter, AnimeId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by anime repository adapters.
    pub enum AnimeRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "anime repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "anime repository query failed: {message}",
        /// The owner already saved this catalogue entry.
        Duplicate { catalog_id: String } => "anime already in list: {catalog_id}",
        /// The owning account no longer exists.
        OwnerMissing { owner: String } => "anime owner does not exist: {owner}",
    }
}

/// Storage for anime entries.
///
/// Every read and mutation takes the owner explicitly; adapters must never
/// return or touch rows belonging to another user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnimeRepository: Send + Sync {
    /// Insert a new entry. Fails with [`AnimeRepositoryError::Duplicate`]
    /// when the owner already holds the same catalogue identifier and with
    /// [`AnimeRepositoryError::OwnerMissing`] when the owner was deleted.
    async fn insert(&self, entry: &AnimeEntry) -> Result<(), AnimeRepositoryError>;

    /// One page of the owner's entries matching `filter`, in the filter's
    /// sort order.
    async fn list_for_owner(
        &self,
        owner: &UserId,
        filter: &AnimeFilter,
        page: PageRequest,
    ) -> Result<Page<AnimeEntry>, AnimeRepositoryError>;

    /// Delete an owned entry and strip it from the owner's playlists in the
    /// same transaction.
    ///
    /// Returns `false` when the entry does not exist or belongs to someone
    /// else.
    async fn delete_for_owner(
        &self,
        owner: &UserId,
        id: &AnimeId,
    ) -> Result<bool, AnimeRepositoryError>;
}
