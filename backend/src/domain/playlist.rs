//! Playlists: named, ordered groupings of a user's anime entries.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::anime::AnimeId;
use super::user::UserId;

/// Maximum playlist title length, in characters.
pub const PLAYLIST_TITLE_MAX: usize = 100;
/// Maximum number of entries in a single playlist.
pub const PLAYLIST_ENTRIES_MAX: usize = 1_000;

/// Validation errors raised by playlist constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaylistValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("title must be at most {max} characters")]
    TitleTooLong { max: usize },
    #[error("a playlist may hold at most {max} entries")]
    TooManyEntries { max: usize },
}

impl PlaylistValidationError {
    /// Name of the request field that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyTitle | Self::TitleTooLong { .. } => "title",
            Self::TooManyEntries { .. } => "animeIds",
        }
    }

    /// Stable machine-readable code describing the failure.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyTitle => "empty_value",
            Self::TitleTooLong { .. } | Self::TooManyEntries { .. } => "too_long",
        }
    }
}

/// Playlist identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaylistId(Uuid);

impl PlaylistId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Validated playlist title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlaylistTitle(String);

impl PlaylistTitle {
    /// Validate and construct a title, trimming surrounding whitespace.
    pub fn new(title: impl AsRef<str>) -> Result<Self, PlaylistValidationError> {
        let trimmed = title.as_ref().trim();
        if trimmed.is_empty() {
            return Err(PlaylistValidationError::EmptyTitle);
        }
        if trimmed.chars().count() > PLAYLIST_TITLE_MAX {
            return Err(PlaylistValidationError::TitleTooLong {
                max: PLAYLIST_TITLE_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for PlaylistTitle {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<PlaylistTitle> for String {
    fn from(value: PlaylistTitle) -> Self {
        value.0
    }
}

impl TryFrom<String> for PlaylistTitle {
    type Error = PlaylistValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Drop repeated identifiers, keeping the first occurrence of each.
///
/// # Examples
/// ```
/// use animelist::domain::{AnimeId, dedupe_anime_ids};
/// use uuid::Uuid;
///
/// let a = AnimeId::from_uuid(Uuid::from_u128(1));
/// let b = AnimeId::from_uuid(Uuid::from_u128(2));
/// assert_eq!(dedupe_anime_ids(vec![a, b, a]), vec![a, b]);
/// ```
pub fn dedupe_anime_ids(ids: Vec<AnimeId>) -> Vec<AnimeId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

/// Validate the entry list of a playlist and remove duplicates.
pub fn validate_anime_ids(ids: Vec<AnimeId>) -> Result<Vec<AnimeId>, PlaylistValidationError> {
    let ids = dedupe_anime_ids(ids);
    if ids.len() > PLAYLIST_ENTRIES_MAX {
        return Err(PlaylistValidationError::TooManyEntries {
            max: PLAYLIST_ENTRIES_MAX,
        });
    }
    Ok(ids)
}

/// Playlist owned by one user.
///
/// ## Invariants
/// - `anime_ids` holds no duplicates and preserves insertion order.
/// - Every referenced entry belongs to `owner`; repositories check this in
///   the same transaction as the write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    #[schema(value_type = String, example = "7c9e6679-7425-40de-944b-e07fc1f90ae7")]
    id: PlaylistId,
    #[schema(value_type = String, example = "Weekend binge")]
    title: PlaylistTitle,
    #[schema(value_type = Vec<String>)]
    anime_ids: Vec<AnimeId>,
    created_at: DateTime<Utc>,
    #[schema(value_type = String)]
    created_by: UserId,
}

impl Playlist {
    /// Assemble a playlist, deduplicating `anime_ids`.
    pub fn new(
        id: PlaylistId,
        owner: UserId,
        title: PlaylistTitle,
        anime_ids: Vec<AnimeId>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title,
            anime_ids: dedupe_anime_ids(anime_ids),
            created_at,
            created_by: owner,
        }
    }

    /// Playlist identifier.
    pub fn id(&self) -> &PlaylistId {
        &self.id
    }

    /// Title.
    pub fn title(&self) -> &PlaylistTitle {
        &self.title
    }

    /// Ordered entry references.
    pub fn anime_ids(&self) -> &[AnimeId] {
        &self.anime_ids
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Owning user.
    pub fn owner(&self) -> &UserId {
        &self.created_by
    }

    /// Apply a partial update.
    #[must_use]
    pub fn apply(mut self, title: Option<PlaylistTitle>, anime_ids: Option<Vec<AnimeId>>) -> Self {
        if let Some(title) = title {
            self.title = title;
        }
        if let Some(ids) = anime_ids {
            self.anime_ids = dedupe_anime_ids(ids);
        }
        self
    }

    /// Drop a reference to a removed anime entry.
    pub fn remove_anime(&mut self, anime_id: &AnimeId) {
        self.anime_ids.retain(|id| id != anime_id);
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn anime(n: u128) -> AnimeId {
        AnimeId::from_uuid(Uuid::from_u128(n))
    }

    #[rstest]
    #[case("", PlaylistValidationError::EmptyTitle)]
    #[case("   ", PlaylistValidationError::EmptyTitle)]
    #[case(&"t".repeat(PLAYLIST_TITLE_MAX + 1), PlaylistValidationError::TitleTooLong { max: PLAYLIST_TITLE_MAX })]
    fn invalid_titles(#[case] input: &str, #[case] expected: PlaylistValidationError) {
        assert_eq!(PlaylistTitle::new(input).expect_err("invalid title"), expected);
    }

    #[rstest]
    fn new_dedupes_preserving_order() {
        let playlist = Playlist::new(
            PlaylistId::random(),
            UserId::random(),
            PlaylistTitle::new("Mix").expect("title"),
            vec![anime(3), anime(1), anime(3), anime(2), anime(1)],
            Utc::now(),
        );
        assert_eq!(playlist.anime_ids(), &[anime(3), anime(1), anime(2)]);
    }

    #[rstest]
    fn apply_keeps_unspecified_fields() {
        let playlist = Playlist::new(
            PlaylistId::random(),
            UserId::random(),
            PlaylistTitle::new("Mix").expect("title"),
            vec![anime(1)],
            Utc::now(),
        );
        let renamed = playlist.clone().apply(Some(PlaylistTitle::new("Renamed").expect("title")), None);
        assert_eq!(renamed.title().as_ref(), "Renamed");
        assert_eq!(renamed.anime_ids(), playlist.anime_ids());
    }

    #[rstest]
    fn remove_anime_strips_reference() {
        let mut playlist = Playlist::new(
            PlaylistId::random(),
            UserId::random(),
            PlaylistTitle::new("Mix").expect("title"),
            vec![anime(1), anime(2)],
            Utc::now(),
        );
        playlist.remove_anime(&anime(1));
        assert_eq!(playlist.anime_ids(), &[anime(2)]);
    }

    #[rstest]
    fn too_many_entries_are_rejected() {
        let ids = (0..=PLAYLIST_ENTRIES_MAX as u128).map(anime).collect();
        assert_eq!(
            validate_anime_ids(ids),
            Err(PlaylistValidationError::TooManyEntries { max: PLAYLIST_ENTRIES_MAX })
        );
    }
}
