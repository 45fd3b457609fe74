//! In-memory persistence adapter.
//!
//! [`InMemoryStore`] implements every repository port over a single
//! `RwLock`, so multi-aggregate writes (account deletion, anime removal,
//! playlist entry checks) happen under one write guard and are atomic with
//! respect to readers and other writers. The
//! server falls back to it when no database is configured, and the HTTP
//! scenario tests use it directly.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::ports::{
    AnimeRepository, AnimeRepositoryError, PlaylistRepository, PlaylistRepositoryError,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    AnimeEntry, AnimeFilter, AnimeId, EmailAddress, Playlist, PlaylistId, StoredCredentials, User,
    UserId,
};

const POISONED: &str = "in-memory store lock poisoned";

#[derive(Debug, Default)]
struct State {
    users: HashMap<UserId, StoredCredentials>,
    animes: HashMap<AnimeId, AnimeEntry>,
    playlists: HashMap<PlaylistId, Playlist>,
}

impl State {
    fn email_taken_by_other(&self, email: &EmailAddress, except: Option<&UserId>) -> bool {
        self.users
            .values()
            .any(|stored| stored.user.email() == email && Some(stored.user.id()) != except)
    }

    /// Reject playlists whose owner is gone or whose entries the owner does
    /// not hold.
    fn check_playlist_refs(&self, playlist: &Playlist) -> Result<(), PlaylistRepositoryError> {
        let owner = playlist.owner();
        if !self.users.contains_key(owner) {
            return Err(PlaylistRepositoryError::owner_missing(owner.to_string()));
        }
        let unknown: Vec<String> = playlist
            .anime_ids()
            .iter()
            .filter(|id| {
                !self
                    .animes
                    .get(*id)
                    .is_some_and(|entry| entry.owner() == owner)
            })
            .map(ToString::to_string)
            .collect();
        if unknown.is_empty() {
            Ok(())
        } else {
            Err(PlaylistRepositoryError::unknown_anime(unknown))
        }
    }
}

/// Shared in-memory store implementing the user, anime and playlist ports.
///
/// Clones share the same underlying state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read<E>(&self, poisoned: impl FnOnce(&'static str) -> E) -> Result<RwLockReadGuard<'_, State>, E> {
        self.state
            .read()
            .map_err(|_: PoisonError<_>| poisoned(POISONED))
    }

    fn write<E>(
        &self,
        poisoned: impl FnOnce(&'static str) -> E,
    ) -> Result<RwLockWriteGuard<'_, State>, E> {
        self.state
            .write()
            .map_err(|_: PoisonError<_>| poisoned(POISONED))
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, account: &StoredCredentials) -> Result<(), UserPersistenceError> {
        let mut state = self.write(UserPersistenceError::query)?;
        if state.email_taken_by_other(account.user.email(), None) {
            return Err(UserPersistenceError::duplicate_email(
                account.user.email().as_ref(),
            ));
        }
        state.users.insert(*account.user.id(), account.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self.read(UserPersistenceError::query)?;
        Ok(state.users.get(id).map(|stored| stored.user.clone()))
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        let state = self.read(UserPersistenceError::query)?;
        Ok(state
            .users
            .values()
            .find(|stored| stored.user.email().as_ref() == email)
            .cloned())
    }

    async fn email_exists(&self, email: &EmailAddress) -> Result<bool, UserPersistenceError> {
        let state = self.read(UserPersistenceError::query)?;
        Ok(state.email_taken_by_other(email, None))
    }

    async fn update_profile(&self, user: &User) -> Result<bool, UserPersistenceError> {
        let mut state = self.write(UserPersistenceError::query)?;
        if state.email_taken_by_other(user.email(), Some(user.id())) {
            return Err(UserPersistenceError::duplicate_email(user.email().as_ref()));
        }
        let Some(stored) = state.users.get_mut(user.id()) else {
            return Ok(false);
        };
        stored.user = user.clone();
        Ok(true)
    }

    async fn delete_with_owned_resources(
        &self,
        id: &UserId,
    ) -> Result<bool, UserPersistenceError> {
        let mut state = self.write(UserPersistenceError::query)?;
        if state.users.remove(id).is_none() {
            return Ok(false);
        }
        state.animes.retain(|_, entry| entry.owner() != id);
        state.playlists.retain(|_, playlist| playlist.owner() != id);
        Ok(true)
    }
}

#[async_trait]
impl AnimeRepository for InMemoryStore {
    async fn insert(&self, entry: &AnimeEntry) -> Result<(), AnimeRepositoryError> {
        let mut state = self.write(AnimeRepositoryError::query)?;
        if !state.users.contains_key(entry.owner()) {
            return Err(AnimeRepositoryError::owner_missing(entry.owner().to_string()));
        }
        let duplicate = state.animes.values().any(|existing| {
            existing.owner() == entry.owner() && existing.catalog_id() == entry.catalog_id()
        });
        if duplicate {
            return Err(AnimeRepositoryError::duplicate(entry.catalog_id()));
        }
        state.animes.insert(*entry.id(), entry.clone());
        Ok(())
    }

    async fn list_for_owner(
        &self,
        owner: &UserId,
        filter: &AnimeFilter,
        page: PageRequest,
    ) -> Result<Page<AnimeEntry>, AnimeRepositoryError> {
        let state = self.read(AnimeRepositoryError::query)?;
        let mut matching: Vec<AnimeEntry> = state
            .animes
            .values()
            .filter(|entry| entry.owner() == owner && filter.matches(entry))
            .cloned()
            .collect();
        drop(state);
        matching.sort_by(|a, b| filter.sort.compare(a, b));
        Ok(Page::from_all(matching, page))
    }

    async fn delete_for_owner(
        &self,
        owner: &UserId,
        id: &AnimeId,
    ) -> Result<bool, AnimeRepositoryError> {
        let mut state = self.write(AnimeRepositoryError::query)?;
        let owned = state
            .animes
            .get(id)
            .is_some_and(|entry| entry.owner() == owner);
        if !owned {
            return Ok(false);
        }
        state.animes.remove(id);
        for playlist in state.playlists.values_mut() {
            if playlist.owner() == owner {
                playlist.remove_anime(id);
            }
        }
        Ok(true)
    }

}

#[async_trait]
impl PlaylistRepository for InMemoryStore {
    async fn insert(&self, playlist: &Playlist) -> Result<(), PlaylistRepositoryError> {
        let mut state = self.write(PlaylistRepositoryError::query)?;
        state.check_playlist_refs(playlist)?;
        state.playlists.insert(*playlist.id(), playlist.clone());
        Ok(())
    }

    async fn list_for_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<Playlist>, PlaylistRepositoryError> {
        let state = self.read(PlaylistRepositoryError::query)?;
        let mut owned: Vec<Playlist> = state
            .playlists
            .values()
            .filter(|playlist| playlist.owner() == owner)
            .cloned()
            .collect();
        drop(state);
        owned.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        Ok(owned)
    }

    async fn find_for_owner(
        &self,
        owner: &UserId,
        id: &PlaylistId,
    ) -> Result<Option<Playlist>, PlaylistRepositoryError> {
        let state = self.read(PlaylistRepositoryError::query)?;
        Ok(state
            .playlists
            .get(id)
            .filter(|playlist| playlist.owner() == owner)
            .cloned())
    }

    async fn update_for_owner(&self, playlist: &Playlist) -> Result<bool, PlaylistRepositoryError> {
        let mut state = self.write(PlaylistRepositoryError::query)?;
        let owned = state
            .playlists
            .get(playlist.id())
            .is_some_and(|existing| existing.owner() == playlist.owner());
        if !owned {
            return Ok(false);
        }
        state.check_playlist_refs(playlist)?;
        state.playlists.insert(*playlist.id(), playlist.clone());
        Ok(true)
    }

    async fn delete_for_owner(
        &self,
        owner: &UserId,
        id: &PlaylistId,
    ) -> Result<bool, PlaylistRepositoryError> {
        let mut state = self.write(PlaylistRepositoryError::query)?;
        let owned = state
            .playlists
            .get(id)
            .is_some_and(|playlist| playlist.owner() == owner);
        if owned {
            state.playlists.remove(id);
        }
        Ok(owned)
    }
}
