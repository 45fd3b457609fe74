//! Driving ports for playlists.

use async_trait::async_trait;

use crate::domain::{AnimeId, Error, Playlist, PlaylistId, PlaylistTitle, UserId};

/// Input for creating a playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlaylist {
    /// Title of the playlist.
    pub title: PlaylistTitle,
    /// Entries to include, in order.
    pub anime_ids: Vec<AnimeId>,
}

/// Partial playlist update. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistChanges {
    /// Replacement title.
    pub title: Option<PlaylistTitle>,
    /// Replacement entry list.
    pub anime_ids: Option<Vec<AnimeId>>,
}

impl PlaylistChanges {
    /// Whether the update carries no changes at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.anime_ids.is_none()
    }
}

/// Playlist mutations.
///
/// Every referenced anime entry must belong to the caller; foreign or
/// unknown identifiers are reported as not found.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlaylistCommand: Send + Sync {
    /// Create a playlist for `owner`.
    async fn create_playlist(&self, owner: &UserId, playlist: NewPlaylist)
    -> Result<Playlist, Error>;

    /// Apply `changes` to an owned playlist.
    async fn update_playlist(
        &self,
        owner: &UserId,
        id: &PlaylistId,
        changes: PlaylistChanges,
    ) -> Result<Playlist, Error>;

    /// Delete an owned playlist.
    async fn delete_playlist(&self, owner: &UserId, id: &PlaylistId) -> Result<(), Error>;
}

/// Playlist reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlaylistQuery: Send + Sync {
    /// Every playlist `owner` created, oldest first.
    async fn list_playlists(&self, owner: &UserId) -> Result<Vec<Playlist>, Error>;

    /// A single owned playlist.
    async fn get_playlist(&self, owner: &UserId, id: &PlaylistId) -> Result<Playlist, Error>;
}
