//! Anime watch-list entries and the list query model.
//!
//! An [`AnimeEntry`] is a snapshot of a catalogue record the client looked up
//! elsewhere, owned by exactly one user. [`AnimeFilter`] and [`AnimeSort`]
//! describe the list view; both persistence adapters must honour the same
//! ordering, which [`AnimeSort::compare`] defines.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::UserId;

/// Maximum catalogue identifier length.
pub const CATALOG_ID_MAX: usize = 64;
/// Maximum title length, in characters.
pub const ANIME_TITLE_MAX: usize = 200;
/// Maximum synopsis length, in characters.
pub const SYNOPSIS_MAX: usize = 10_000;
/// Maximum cover image reference length.
pub const COVER_IMAGE_MAX: usize = 2_048;
/// Maximum length of the short optional text fields.
pub const SHORT_TEXT_MAX: usize = 64;
/// Largest accepted episode count.
pub const EPISODE_COUNT_MAX: i64 = 100_000;
/// Upper bound of the rating scale.
pub const RATING_MAX: f64 = 100.0;

/// Validation errors raised while building an [`AnimeEntry`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnimeValidationError {
    #[error("catalogue id must not be empty")]
    EmptyCatalogId,
    #[error("catalogue id must be at most {max} characters")]
    CatalogIdTooLong { max: usize },
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("title must be at most {max} characters")]
    TitleTooLong { max: usize },
    #[error("rating must be a number between 0 and 100")]
    RatingOutOfRange,
    #[error("episode count must be between 0 and {max}")]
    EpisodeCountOutOfRange { max: i64 },
    #[error("{field} must be at most {max} characters")]
    TextTooLong { field: &'static str, max: usize },
    #[error("format must be one of: tv, movie, ova, ona, special, music, unknown")]
    UnknownFormat,
    #[error("status must be one of: planned, watching, completed, dropped")]
    UnknownStatus,
    #[error("sort must be one of: latest, oldest, a-z, z-a, rating, format, date added")]
    UnknownSort,
}

impl AnimeValidationError {
    /// Name of the request field that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyCatalogId | Self::CatalogIdTooLong { .. } => "id",
            Self::EmptyTitle | Self::TitleTooLong { .. } => "title",
            Self::RatingOutOfRange => "rating",
            Self::EpisodeCountOutOfRange { .. } => "episodeCount",
            Self::TextTooLong { field, .. } => field,
            Self::UnknownFormat => "format",
            Self::UnknownStatus => "status",
            Self::UnknownSort => "sort",
        }
    }

    /// Stable machine-readable code describing the failure.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyCatalogId | Self::EmptyTitle => "empty_value",
            Self::CatalogIdTooLong { .. } | Self::TitleTooLong { .. } | Self::TextTooLong { .. } => {
                "too_long"
            }
            Self::RatingOutOfRange | Self::EpisodeCountOutOfRange { .. } => "out_of_range",
            Self::UnknownFormat | Self::UnknownStatus | Self::UnknownSort => "unknown_value",
        }
    }
}

/// Watch-list entry identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnimeId(Uuid);

impl AnimeId {
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

impl fmt::Display for AnimeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Broadcast format of an anime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AnimeFormat {
    Tv,
    Movie,
    Ova,
    Ona,
    Special,
    Music,
    Unknown,
}

impl AnimeFormat {
    /// Stable lowercase string form used in storage, queries and JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tv => "tv",
            Self::Movie => "movie",
            Self::Ova => "ova",
            Self::Ona => "ona",
            Self::Special => "special",
            Self::Music => "music",
            Self::Unknown => "unknown",
        }
    }
}

impl FromStr for AnimeFormat {
    type Err = AnimeValidationError;

    /// Parses catalogue subtypes case-insensitively; `n/a` maps to
    /// [`AnimeFormat::Unknown`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tv" => Ok(Self::Tv),
            "movie" => Ok(Self::Movie),
            "ova" => Ok(Self::Ova),
            "ona" => Ok(Self::Ona),
            "special" => Ok(Self::Special),
            "music" => Ok(Self::Music),
            "unknown" | "n/a" => Ok(Self::Unknown),
            _ => Err(AnimeValidationError::UnknownFormat),
        }
    }
}

impl fmt::Display for AnimeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress of the owner through an anime.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum WatchStatus {
    #[default]
    Planned,
    Watching,
    Completed,
    Dropped,
}

impl WatchStatus {
    /// Stable lowercase string form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::Watching => "watching",
            Self::Completed => "completed",
            Self::Dropped => "dropped",
        }
    }
}

impl FromStr for WatchStatus {
    type Err = AnimeValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "planned" => Ok(Self::Planned),
            "watching" => Ok(Self::Watching),
            "completed" => Ok(Self::Completed),
            "dropped" => Ok(Self::Dropped),
            _ => Err(AnimeValidationError::UnknownStatus),
        }
    }
}

impl fmt::Display for WatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unvalidated anime payload supplied by a client.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimeDraft {
    /// Identifier of the record in the third-party catalogue.
    pub catalog_id: String,
    /// Display title.
    pub title: String,
    /// Average catalogue rating on a 0–100 scale.
    pub rating: Option<f64>,
    /// Broadcast format.
    pub format: AnimeFormat,
    /// Number of episodes, when known.
    pub episode_count: Option<i64>,
    /// Plot summary.
    pub synopsis: String,
    /// Cover image URL.
    pub cover_image: String,
    /// Date the anime started airing.
    pub creation_date: Option<NaiveDate>,
    /// Trailer video identifier.
    pub youtube_video_id: Option<String>,
    /// Age rating label, for example `PG`.
    pub age_rating: Option<String>,
    /// Initial watch status.
    pub status: WatchStatus,
}

/// Anime saved to a user's watch-list.
///
/// ## Invariants
/// - `title` is trimmed, non-empty and at most [`ANIME_TITLE_MAX`] characters.
/// - `rating`, when present, is finite and within `0..=100`.
/// - Blank optional text fields are stored as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnimeEntry {
    #[schema(value_type = String, example = "0f8fad5b-d9cb-469f-a165-70867728950e")]
    id: AnimeId,
    #[schema(example = "1376")]
    catalog_id: String,
    #[schema(example = "Cowboy Bebop")]
    title: String,
    #[schema(example = 82.5)]
    rating: Option<f64>,
    format: AnimeFormat,
    episode_count: Option<u32>,
    synopsis: String,
    cover_image: String,
    creation_date: Option<NaiveDate>,
    youtube_video_id: Option<String>,
    age_rating: Option<String>,
    status: WatchStatus,
    added_at: DateTime<Utc>,
    #[schema(value_type = String)]
    created_by: UserId,
}

fn bounded_text(value: &str, field: &'static str, max: usize) -> Result<String, AnimeValidationError> {
    let trimmed = value.trim();
    if trimmed.chars().count() > max {
        return Err(AnimeValidationError::TextTooLong { field, max });
    }
    Ok(trimmed.to_owned())
}

fn optional_text(
    value: Option<String>,
    field: &'static str,
) -> Result<Option<String>, AnimeValidationError> {
    value
        .map(|raw| bounded_text(&raw, field, SHORT_TEXT_MAX))
        .transpose()
        .map(|text| text.filter(|t| !t.is_empty()))
}

impl AnimeEntry {
    /// Validate a draft and bind it to its owner.
    ///
    /// # Examples
    /// ```
    /// use animelist::domain::{AnimeDraft, AnimeEntry, AnimeFormat, AnimeId, UserId, WatchStatus};
    ///
    /// let draft = AnimeDraft {
    ///     catalog_id: "1".into(),
    ///     title: "  Cowboy Bebop ".into(),
    ///     rating: Some(82.5),
    ///     format: AnimeFormat::Tv,
    ///     episode_count: Some(26),
    ///     synopsis: String::new(),
    ///     cover_image: String::new(),
    ///     creation_date: None,
    ///     youtube_video_id: Some(" ".into()),
    ///     age_rating: None,
    ///     status: WatchStatus::default(),
    /// };
    /// let entry = AnimeEntry::new(AnimeId::random(), UserId::random(), draft, chrono::Utc::now())
    ///     .expect("valid draft");
    /// assert_eq!(entry.title(), "Cowboy Bebop");
    /// assert_eq!(entry.youtube_video_id(), None);
    /// ```
    pub fn new(
        id: AnimeId,
        owner: UserId,
        draft: AnimeDraft,
        added_at: DateTime<Utc>,
    ) -> Result<Self, AnimeValidationError> {
        let AnimeDraft {
            catalog_id,
            title,
            rating,
            format,
            episode_count,
            synopsis,
            cover_image,
            creation_date,
            youtube_video_id,
            age_rating,
            status,
        } = draft;

        let catalog_id = catalog_id.trim();
        if catalog_id.is_empty() {
            return Err(AnimeValidationError::EmptyCatalogId);
        }
        if catalog_id.chars().count() > CATALOG_ID_MAX {
            return Err(AnimeValidationError::CatalogIdTooLong {
                max: CATALOG_ID_MAX,
            });
        }

        let title = title.trim();
        if title.is_empty() {
            return Err(AnimeValidationError::EmptyTitle);
        }
        if title.chars().count() > ANIME_TITLE_MAX {
            return Err(AnimeValidationError::TitleTooLong {
                max: ANIME_TITLE_MAX,
            });
        }

        if rating.is_some_and(|value| !(value.is_finite() && (0.0..=RATING_MAX).contains(&value))) {
            return Err(AnimeValidationError::RatingOutOfRange);
        }

        let episode_count = episode_count
            .map(|count| {
                if (0..=EPISODE_COUNT_MAX).contains(&count) {
                    u32::try_from(count).map_err(|_| AnimeValidationError::EpisodeCountOutOfRange {
                        max: EPISODE_COUNT_MAX,
                    })
                } else {
                    Err(AnimeValidationError::EpisodeCountOutOfRange {
                        max: EPISODE_COUNT_MAX,
                    })
                }
            })
            .transpose()?;

        Ok(Self {
            id,
            catalog_id: catalog_id.to_owned(),
            title: title.to_owned(),
            rating,
            format,
            episode_count,
            synopsis: bounded_text(&synopsis, "synopsis", SYNOPSIS_MAX)?,
            cover_image: bounded_text(&cover_image, "coverImage", COVER_IMAGE_MAX)?,
            creation_date,
            youtube_video_id: optional_text(youtube_video_id, "youtubeVideoId")?,
            age_rating: optional_text(age_rating, "ageRating")?,
            status,
            added_at,
            created_by: owner,
        })
    }

    /// Entry identifier.
    pub fn id(&self) -> &AnimeId {
        &self.id
    }

    /// Catalogue identifier; unique per owner.
    pub fn catalog_id(&self) -> &str {
        self.catalog_id.as_str()
    }

    /// Display title.
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Catalogue rating.
    pub fn rating(&self) -> Option<f64> {
        self.rating
    }

    /// Broadcast format.
    pub fn format(&self) -> AnimeFormat {
        self.format
    }

    /// Episode count.
    pub fn episode_count(&self) -> Option<u32> {
        self.episode_count
    }

    /// Plot summary.
    pub fn synopsis(&self) -> &str {
        self.synopsis.as_str()
    }

    /// Cover image URL.
    pub fn cover_image(&self) -> &str {
        self.cover_image.as_str()
    }

    /// First airing date.
    pub fn creation_date(&self) -> Option<NaiveDate> {
        self.creation_date
    }

    /// Trailer video identifier.
    pub fn youtube_video_id(&self) -> Option<&str> {
        self.youtube_video_id.as_deref()
    }

    /// Age rating label.
    pub fn age_rating(&self) -> Option<&str> {
        self.age_rating.as_deref()
    }

    /// Watch status.
    pub fn status(&self) -> WatchStatus {
        self.status
    }

    /// When the entry was added to the list.
    pub fn added_at(&self) -> DateTime<Utc> {
        self.added_at
    }

    /// Owning user.
    pub fn owner(&self) -> &UserId {
        &self.created_by
    }
}

/// Sort orders offered by the list view.
///
/// Every order ends with an ascending tie-break on the entry identifier so
/// that pages never overlap or skip records.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimeSort {
    /// Most recently aired first; unknown air dates last.
    #[default]
    Latest,
    /// Earliest aired first; unknown air dates last.
    Oldest,
    /// Title, case-insensitive ascending.
    TitleAsc,
    /// Title, case-insensitive descending.
    TitleDesc,
    /// Highest rating first; unrated last.
    Rating,
    /// Grouped by format, then title.
    Format,
    /// Most recently added first.
    DateAdded,
}

impl FromStr for AnimeSort {
    type Err = AnimeValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "latest" => Ok(Self::Latest),
            "oldest" => Ok(Self::Oldest),
            "a-z" => Ok(Self::TitleAsc),
            "z-a" => Ok(Self::TitleDesc),
            "rating" => Ok(Self::Rating),
            "format" => Ok(Self::Format),
            "date added" | "date-added" | "date_added" => Ok(Self::DateAdded),
            _ => Err(AnimeValidationError::UnknownSort),
        }
    }
}

fn nulls_last<T: Ord>(a: Option<T>, b: Option<T>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.cmp(&a),
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn title_key(entry: &AnimeEntry) -> String {
    entry.title.to_lowercase()
}

impl AnimeSort {
    /// Total order between two entries for this sort.
    pub fn compare(self, a: &AnimeEntry, b: &AnimeEntry) -> Ordering {
        let primary = match self {
            Self::Latest => nulls_last(a.creation_date, b.creation_date, true),
            Self::Oldest => nulls_last(a.creation_date, b.creation_date, false),
            Self::TitleAsc => title_key(a).cmp(&title_key(b)),
            Self::TitleDesc => title_key(b).cmp(&title_key(a)),
            Self::Rating => match (a.rating, b.rating) {
                (Some(x), Some(y)) => y.total_cmp(&x),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            Self::Format => a
                .format
                .as_str()
                .cmp(b.format.as_str())
                .then_with(|| title_key(a).cmp(&title_key(b))),
            Self::DateAdded => b.added_at.cmp(&a.added_at),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

/// Filter and ordering for the anime list.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AnimeFilter {
    /// Only entries with this status.
    pub status: Option<WatchStatus>,
    /// Only entries with this format.
    pub format: Option<AnimeFormat>,
    /// Case-insensitive title substring; blank input is ignored.
    pub search: Option<String>,
    /// Result ordering.
    pub sort: AnimeSort,
}

impl AnimeFilter {
    /// Normalised search term, if any.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }

    /// Whether an entry passes the status, format and search filters.
    pub fn matches(&self, entry: &AnimeEntry) -> bool {
        self.status.is_none_or(|status| entry.status == status)
            && self.format.is_none_or(|format| entry.format == format)
            && self.search_term().is_none_or(|term| {
                entry.title.to_lowercase().contains(&term.to_lowercase())
            })
    }
}
