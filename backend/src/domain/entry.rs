//! Journal entry model.
//!
//! An entry is written once and then read through two views: by its own
//! identifier and by its owner in reverse-chronological order. Both views
//! carry the same fields, so [`EntrySummary`] and [`Entry`] share a shape.

use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::{NoContext, Timestamp, Uuid};

use super::photo_list::{PhotoList, PhotoListValidationError};
use super::user::{UserId, UserValidationError};

/// Maximum title length, in characters.
pub const TITLE_MAX: usize = 255;
/// Maximum location length, in characters.
pub const LOCATION_MAX: usize = 255;

/// Validation errors for entry input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValidationError {
    InvalidEntryId,
    Owner(UserValidationError),
    EmptyTitle,
    TitleTooLong { max: usize },
    EmptyContent,
    LocationTooLong { max: usize },
    /// Text fields are stored as PostgreSQL `text`, which cannot hold NUL.
    ContainsNul { field: &'static str },
    Photos(PhotoListValidationError),
    LimitOutOfRange { min: u32, max: u32 },
}

impl EntryValidationError {
    /// Name of the offending request field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidEntryId => "entry_id",
            Self::Owner(_) => "user_id",
            Self::EmptyTitle | Self::TitleTooLong { .. } => "title",
            Self::EmptyContent => "content",
            Self::LocationTooLong { .. } => "location",
            Self::ContainsNul { field } => field,
            Self::Photos(_) => "photos",
            Self::LimitOutOfRange { .. } => "limit",
        }
    }
}

impl fmt::Display for EntryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEntryId => write!(f, "entry id must be a valid UUID"),
            Self::Owner(err) => write!(f, "{err}"),
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::TitleTooLong { max } => write!(f, "title must be at most {max} characters"),
            Self::EmptyContent => write!(f, "content must not be empty"),
            Self::LocationTooLong { max } => {
                write!(f, "location must be at most {max} characters")
            }
            Self::ContainsNul { field } => write!(f, "{field} must not contain NUL characters"),
            Self::Photos(err) => write!(f, "{err}"),
            Self::LimitOutOfRange { min, max } => {
                write!(f, "limit must be between {min} and {max}")
            }
        }
    }
}

impl std::error::Error for EntryValidationError {}

fn reject_nul(value: &str, field: &'static str) -> Result<(), EntryValidationError> {
    if value.contains('\0') {
        return Err(EntryValidationError::ContainsNul { field });
    }
    Ok(())
}

impl From<UserValidationError> for EntryValidationError {
    fn from(value: UserValidationError) -> Self {
        Self::Owner(value)
    }
}

impl From<PhotoListValidationError> for EntryValidationError {
    fn from(value: PhotoListValidationError) -> Self {
        Self::Photos(value)
    }
}

/// Time-ordered entry identifier (UUID v7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntryId(Uuid);

impl EntryId {
    /// Parse an identifier supplied by a caller.
    pub fn new(id: impl AsRef<str>) -> Result<Self, EntryValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| EntryValidationError::InvalidEntryId)
    }

    /// Wrap a UUID read back from a store.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Mint a fresh identifier whose embedded timestamp is `created_at`.
    ///
    /// Instants before the Unix epoch cannot be embedded; those fall back to
    /// the current time.
    pub fn for_instant(created_at: DateTime<Utc>) -> Self {
        match (
            u64::try_from(created_at.timestamp()),
            created_at.timestamp_subsec_nanos(),
        ) {
            (Ok(secs), nanos) => Self(Uuid::new_v7(Timestamp::from_unix(NoContext, secs, nanos))),
            (Err(_), _) => Self(Uuid::now_v7()),
        }
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<EntryId> for String {
    fn from(value: EntryId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for EntryId {
    type Error = EntryValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Entry title: trimmed, non-empty, at most [`TITLE_MAX`] characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryTitle(String);

impl EntryTitle {
    pub fn new(raw: &str) -> Result<Self, EntryValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(EntryValidationError::EmptyTitle);
        }
        if trimmed.chars().count() > TITLE_MAX {
            return Err(EntryValidationError::TitleTooLong { max: TITLE_MAX });
        }
        reject_nul(trimmed, "title")?;
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Entry body text. Must not be blank; stored exactly as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryContent(String);

impl EntryContent {
    pub fn new(raw: &str) -> Result<Self, EntryValidationError> {
        if raw.trim().is_empty() {
            return Err(EntryValidationError::EmptyContent);
        }
        reject_nul(raw, "content")?;
        Ok(Self(raw.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Free-form place name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryLocation(String);

impl EntryLocation {
    /// Returns `Ok(None)` for absent or blank input.
    pub fn parse(raw: Option<&str>) -> Result<Option<Self>, EntryValidationError> {
        let Some(trimmed) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
            return Ok(None);
        };
        if trimmed.chars().count() > LOCATION_MAX {
            return Err(EntryValidationError::LocationTooLong { max: LOCATION_MAX });
        }
        reject_nul(trimmed, "location")?;
        Ok(Some(Self(trimmed.to_owned())))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Page size for listing a user's entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryListLimit(u32);

impl EntryListLimit {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 100;
    pub const DEFAULT: Self = Self(10);

    pub fn new(limit: u32) -> Result<Self, EntryValidationError> {
        if !(Self::MIN..=Self::MAX).contains(&limit) {
            return Err(EntryValidationError::LimitOutOfRange {
                min: Self::MIN,
                max: Self::MAX,
            });
        }
        Ok(Self(limit))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for EntryListLimit {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Validated input for creating an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    pub user_id: UserId,
    pub title: EntryTitle,
    pub content: EntryContent,
    pub location: Option<EntryLocation>,
    pub photos: PhotoList,
}

impl NewEntry {
    /// Validate raw request fields.
    ///
    /// A missing or malformed owner is rejected rather than replaced with a
    /// placeholder account.
    ///
    /// # Examples
    /// ```
    /// use journal::domain::NewEntry;
    ///
    /// let entry = NewEntry::try_from_parts(
    ///     "3fa85f64-5717-4562-b3fc-2c963f66afa6",
    ///     "Paris trip",
    ///     "Saw the tower",
    ///     Some("Paris"),
    ///     vec!["p1.jpg".into()],
    /// )
    /// .unwrap();
    /// assert_eq!(entry.title.as_str(), "Paris trip");
    /// ```
    pub fn try_from_parts(
        user_id: &str,
        title: &str,
        content: &str,
        location: Option<&str>,
        photos: Vec<String>,
    ) -> Result<Self, EntryValidationError> {
        Ok(Self {
            user_id: UserId::new(user_id)?,
            title: EntryTitle::new(title)?,
            content: EntryContent::new(content)?,
            location: EntryLocation::parse(location)?,
            photos: PhotoList::new(photos)?,
        })
    }
}

/// Stored journal entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: EntryId,
    pub user_id: UserId,
    pub title: EntryTitle,
    pub content: EntryContent,
    pub location: Option<EntryLocation>,
    pub photos: PhotoList,
    pub created_at: DateTime<Utc>,
}

impl Entry {
    /// Materialise a new entry at `created_at`.
    pub fn from_new(id: EntryId, new_entry: NewEntry, created_at: DateTime<Utc>) -> Self {
        let NewEntry {
            user_id,
            title,
            content,
            location,
            photos,
        } = new_entry;
        Self {
            id,
            user_id,
            title,
            content,
            location,
            photos,
            created_at,
        }
    }

    /// Rebuild an entry from stored columns without re-running input
    /// validation.
    pub fn from_stored(
        id: EntryId,
        user_id: UserId,
        title: String,
        content: String,
        location: Option<String>,
        photos: PhotoList,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            title: EntryTitle(title),
            content: EntryContent(content),
            location: location.map(EntryLocation),
            photos,
            created_at,
        }
    }
}

/// Row of the by-owner view.
pub type EntrySummary = Entry;

/// Identifier and timestamp assigned by a successful create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatedEntry {
    pub entry_id: EntryId,
    pub created_at: DateTime<Utc>,
}

/// Creation timestamps are kept at microsecond resolution, the finest every
/// backend stores.
pub fn creation_instant(now: DateTime<Utc>) -> DateTime<Utc> {
    now.trunc_subsecs(6)
}
