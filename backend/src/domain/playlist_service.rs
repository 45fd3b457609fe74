//! Playlist service implementing [`PlaylistCommand`] and [`PlaylistQuery`].
//!
//! A playlist may only reference entries from its owner's watch list. The
//! repository confirms ownership of every referenced identifier in the same
//! transaction as the write, so a caller can neither probe nor link another
//! user's entries, even while those entries are being deleted.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;

use crate::domain::ports::{
    NewPlaylist, PlaylistChanges, PlaylistCommand, PlaylistQuery, PlaylistRepository,
    PlaylistRepositoryError,
};
use crate::domain::{
    AnimeId, Error, Playlist, PlaylistId, PlaylistValidationError, UserId, validate_anime_ids,
};

/// Playlist service over a playlist repository.
#[derive(Clone)]
pub struct PlaylistService<P> {
    playlists: Arc<P>,
    clock: Arc<dyn Clock>,
}

impl<P> PlaylistService<P> {
    /// Create a new service stamping creation times from `clock`.
    pub fn new(playlists: Arc<P>, clock: Arc<dyn Clock>) -> Self {
        Self { playlists, clock }
    }
}

impl<P> PlaylistService<P>
where
    P: PlaylistRepository,
{
    fn map_playlist_error(error: PlaylistRepositoryError) -> Error {
        match error {
            PlaylistRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("playlist repository unavailable: {message}"))
            }
            PlaylistRepositoryError::Query { message } => {
                Error::internal(format!("playlist repository error: {message}"))
            }
            PlaylistRepositoryError::OwnerMissing { .. } => {
                Error::unauthorized("account no longer exists")
                    .with_details(json!({ "code": "account_missing" }))
            }
            PlaylistRepositoryError::UnknownAnime { anime_ids } => {
                Error::not_found("playlist references unknown anime").with_details(json!({
                    "field": "animeIds",
                    "code": "unknown_anime",
                    "animeIds": anime_ids,
                }))
            }
        }
    }

    fn map_validation_error(error: PlaylistValidationError) -> Error {
        Error::invalid_request(error.to_string()).with_details(json!({
            "field": error.field(),
            "code": error.code(),
        }))
    }

    fn not_found(id: &PlaylistId) -> Error {
        Error::not_found(format!("no playlist with id {id}"))
    }

    fn entries(ids: Vec<AnimeId>) -> Result<Vec<AnimeId>, Error> {
        validate_anime_ids(ids).map_err(Self::map_validation_error)
    }
}

#[async_trait]
impl<P> PlaylistCommand for PlaylistService<P>
where
    P: PlaylistRepository,
{
    async fn create_playlist(
        &self,
        owner: &UserId,
        playlist: NewPlaylist,
    ) -> Result<Playlist, Error> {
        let NewPlaylist { title, anime_ids } = playlist;
        let anime_ids = Self::entries(anime_ids)?;
        let playlist = Playlist::new(
            PlaylistId::random(),
            *owner,
            title,
            anime_ids,
            self.clock.utc(),
        );
        self.playlists
            .insert(&playlist)
            .await
            .map_err(Self::map_playlist_error)?;
        Ok(playlist)
    }

    async fn update_playlist(
        &self,
        owner: &UserId,
        id: &PlaylistId,
        changes: PlaylistChanges,
    ) -> Result<Playlist, Error> {
        let current = self
            .playlists
            .find_for_owner(owner, id)
            .await
            .map_err(Self::map_playlist_error)?
            .ok_or_else(|| Self::not_found(id))?;
        if changes.is_empty() {
            return Ok(current);
        }

        let PlaylistChanges { title, anime_ids } = changes;
        let anime_ids = anime_ids.map(Self::entries).transpose()?;
        let updated = current.apply(title, anime_ids);
        let found = self
            .playlists
            .update_for_owner(&updated)
            .await
            .map_err(Self::map_playlist_error)?;
        if !found {
            return Err(Self::not_found(id));
        }
        Ok(updated)
    }

    async fn delete_playlist(&self, owner: &UserId, id: &PlaylistId) -> Result<(), Error> {
        let deleted = self
            .playlists
            .delete_for_owner(owner, id)
            .await
            .map_err(Self::map_playlist_error)?;
        if deleted {
            Ok(())
        } else {
            Err(Self::not_found(id))
        }
    }
}

#[async_trait]
impl<P> PlaylistQuery for PlaylistService<P>
where
    P: PlaylistRepository,
{
    async fn list_playlists(&self, owner: &UserId) -> Result<Vec<Playlist>, Error> {
        self.playlists
            .list_for_owner(owner)
            .await
            .map_err(Self::map_playlist_error)
    }

    async fn get_playlist(&self, owner: &UserId, id: &PlaylistId) -> Result<Playlist, Error> {
        self.playlists
            .find_for_owner(owner, id)
            .await
            .map_err(Self::map_playlist_error)?
            .ok_or_else(|| Self::not_found(id))
    }
}

#[cfg(test)]
mod tests {
    //! Ownership and partial-update coverage.
    use super::*;
    use crate::domain::ports::MockPlaylistRepository;
    use crate::domain::playlist::PLAYLIST_ENTRIES_MAX;
    use crate::domain::{ErrorCode, PlaylistTitle};
    use crate::test_support::{FixtureClock, fixture_timestamp};
    use rstest::rstest;
    use uuid::Uuid;

    type Service = PlaylistService<MockPlaylistRepository>;

    fn anime(n: u128) -> AnimeId {
        AnimeId::from_uuid(Uuid::from_u128(n))
    }

    fn title(value: &str) -> PlaylistTitle {
        PlaylistTitle::new(value).expect("valid title")
    }

    fn service(playlists: MockPlaylistRepository) -> Service {
        PlaylistService::new(Arc::new(playlists), Arc::new(FixtureClock::default()))
    }

    #[tokio::test]
    async fn create_playlist_dedupes_and_stamps_clock_time() {
        let owner = UserId::random();
        let mut playlists = MockPlaylistRepository::new();
        playlists
            .expect_insert()
            .withf(move |p| p.owner() == &owner && p.anime_ids() == [anime(1), anime(2)])
            .times(1)
            .return_once(|_| Ok(()));

        let created = service(playlists)
            .create_playlist(
                &owner,
                NewPlaylist {
                    title: title("Favourites"),
                    anime_ids: vec![anime(1), anime(2), anime(1)],
                },
            )
            .await
            .expect("playlist created");
        assert_eq!(created.title().as_ref(), "Favourites");
        assert_eq!(created.created_at(), fixture_timestamp());
    }

    #[tokio::test]
    async fn create_playlist_reports_foreign_entries() {
        let mut playlists = MockPlaylistRepository::new();
        playlists
            .expect_insert()
            .times(1)
            .return_once(|_| {
                Err(PlaylistRepositoryError::unknown_anime(vec![
                    anime(7).to_string(),
                ]))
            });

        let err = service(playlists)
            .create_playlist(
                &UserId::random(),
                NewPlaylist {
                    title: title("Mix"),
                    anime_ids: vec![anime(1), anime(7)],
                },
            )
            .await
            .expect_err("foreign entry");
        assert_eq!(err.code(), ErrorCode::NotFound);
        let details = err.details().cloned().expect("details present");
        assert_eq!(details["code"], json!("unknown_anime"));
        assert_eq!(details["animeIds"], json!([anime(7).to_string()]));
    }

    #[tokio::test]
    async fn writes_for_a_deleted_owner_are_unauthorised() {
        let owner = UserId::random();
        let mut playlists = MockPlaylistRepository::new();
        playlists
            .expect_insert()
            .return_once(move |_| Err(PlaylistRepositoryError::owner_missing(owner.to_string())));

        let err = service(playlists)
            .create_playlist(
                &owner,
                NewPlaylist {
                    title: title("Orphan"),
                    anime_ids: Vec::new(),
                },
            )
            .await
            .expect_err("owner gone");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn oversized_playlists_never_reach_the_repository() {
        let mut playlists = MockPlaylistRepository::new();
        playlists.expect_insert().never();
        let ids = (0..=PLAYLIST_ENTRIES_MAX as u128).map(anime).collect();

        let err = service(playlists)
            .create_playlist(
                &UserId::random(),
                NewPlaylist {
                    title: title("Everything"),
                    anime_ids: ids,
                },
            )
            .await
            .expect_err("too many entries");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn update_playlist_changes_only_supplied_fields() {
        let owner = UserId::random();
        let existing = Playlist::new(
            PlaylistId::random(),
            owner,
            title("Before"),
            vec![anime(1)],
            fixture_timestamp(),
        );
        let id = *existing.id();
        let mut playlists = MockPlaylistRepository::new();
        playlists
            .expect_find_for_owner()
            .return_once(move |_, _| Ok(Some(existing)));
        playlists
            .expect_update_for_owner()
            .withf(|p| p.title().as_ref() == "After" && p.anime_ids() == [anime(1)])
            .return_once(|_| Ok(true));

        let updated = service(playlists)
            .update_playlist(
                &owner,
                &id,
                PlaylistChanges {
                    title: Some(title("After")),
                    anime_ids: None,
                },
            )
            .await
            .expect("update succeeds");
        assert_eq!(updated.title().as_ref(), "After");
    }

    #[tokio::test]
    async fn update_playlist_of_other_user_is_not_found() {
        let mut playlists = MockPlaylistRepository::new();
        playlists.expect_find_for_owner().return_once(|_, _| Ok(None));
        playlists.expect_update_for_owner().never();

        let err = service(playlists)
            .update_playlist(
                &UserId::random(),
                &PlaylistId::random(),
                PlaylistChanges {
                    title: Some(title("Stolen")),
                    anime_ids: None,
                },
            )
            .await
            .expect_err("not found");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[case(true, None)]
    #[case(false, Some(ErrorCode::NotFound))]
    #[tokio::test]
    async fn delete_playlist_reports_missing(
        #[case] deleted: bool,
        #[case] expected: Option<ErrorCode>,
    ) {
        let mut playlists = MockPlaylistRepository::new();
        playlists
            .expect_delete_for_owner()
            .times(1)
            .return_once(move |_, _| Ok(deleted));
        let result = service(playlists)
            .delete_playlist(&UserId::random(), &PlaylistId::random())
            .await;
        assert_eq!(result.err().map(|err| err.code()), expected);
    }

    #[tokio::test]
    async fn get_playlist_maps_connection_errors() {
        let mut playlists = MockPlaylistRepository::new();
        playlists
            .expect_find_for_owner()
            .return_once(|_, _| Err(PlaylistRepositoryError::connection("down")));
        let err = service(playlists)
            .get_playlist(&UserId::random(), &PlaylistId::random())
            .await
            .expect_err("unavailable");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
