//! Port for owner-scoped playlist persistence.

use async_trait::async_trait;

use crate::domain::{Playlist, PlaylistId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by playlist repository adapters.
    pub enum PlaylistRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "playlist repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "playlist repository query failed: {message}",
        /// The owning account no longer exists.
        OwnerMissing { owner: String } => "playlist owner does not exist: {owner}",
        /// Entries reference anime the owner does not hold.
        UnknownAnime { anime_ids: Vec<String> } => "playlist references unknown anime: {anime_ids:?}",
    }
}

/// Storage for playlists, always filtered by owner.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlaylistRepository: Send + Sync {
    /// Insert a new playlist.
    ///
    /// The owner and every referenced anime entry are checked in the same
    /// transaction as the write; entries the owner does not hold fail with
    /// [`PlaylistRepositoryError::UnknownAnime`].
    async fn insert(&self, playlist: &Playlist) -> Result<(), PlaylistRepositoryError>;

    /// All playlists of `owner`, oldest first.
    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<Playlist>, PlaylistRepositoryError>;

    /// A single owned playlist.
    async fn find_for_owner(
        &self,
        owner: &UserId,
        id: &PlaylistId,
    ) -> Result<Option<Playlist>, PlaylistRepositoryError>;

    /// Persist the title and entries of an owned playlist.
    ///
    /// Entry ownership is checked atomically with the write, as for
    /// [`PlaylistRepository::insert`].
    ///
    /// Returns `false` when the playlist no longer exists for its owner.
    async fn update_for_owner(&self, playlist: &Playlist) -> Result<bool, PlaylistRepositoryError>;

    /// Delete an owned playlist. Returns `false` when nothing matched.
    async fn delete_for_owner(
        &self,
        owner: &UserId,
        id: &PlaylistId,
    ) -> Result<bool, PlaylistRepositoryError>;
}
