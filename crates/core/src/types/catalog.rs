//! OpenLibrary catalog records.
//!
//! Field names on the wire follow OpenLibrary's search and works APIs
//! (`author_name`, `cover_i`, ...). The proxy relays upstream JSON untouched;
//! these types are how the client reads it.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Base URL for cover images.
pub const COVERS_BASE_URL: &str = "https://covers.openlibrary.org/b/id";

/// Text shown when a work has no description.
pub const NO_DESCRIPTION: &str = "No description available.";

/// Maximum number of subjects shown for a work.
pub const MAX_DISPLAYED_SUBJECTS: usize = 10;

/// A book as returned by catalog search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Stable catalog key, e.g. `/works/OL45883W`.
    pub key: String,
    pub title: String,
    #[serde(rename = "author_name", default, skip_serializing_if = "Vec::is_empty")]
    pub author_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_publish_year: Option<i32>,
    #[serde(rename = "cover_i", default, skip_serializing_if = "Option::is_none")]
    pub cover_image_id: Option<i64>,
}

impl CatalogItem {
    /// First listed author, if any.
    #[must_use]
    pub fn primary_author(&self) -> Option<&str> {
        self.author_names.first().map(String::as_str)
    }

    /// Cover image URL at the given size, if the item has a cover.
    #[must_use]
    pub fn cover_url(&self, size: CoverSize) -> Option<String> {
        self.cover_image_id.map(|id| cover_url(id, size))
    }

    /// The work id this item's key points at, if it is a work key.
    #[must_use]
    pub fn work_id(&self) -> Option<WorkId> {
        WorkId::parse(&self.key).ok()
    }
}

/// Cover image sizes offered by the covers service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverSize {
    /// Thumbnail, used in cart rows.
    Small,
    /// Result cards.
    Medium,
    /// Detail view.
    Large,
}

impl CoverSize {
    const fn suffix(self) -> &'static str {
        match self {
            Self::Small => "S",
            Self::Medium => "M",
            Self::Large => "L",
        }
    }
}

/// Build a cover URL from a cover id.
#[must_use]
pub fn cover_url(cover_id: i64, size: CoverSize) -> String {
    format!("{COVERS_BASE_URL}/{cover_id}-{}.jpg", size.suffix())
}

/// Errors from [`WorkId::parse`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkIdError {
    #[error("work id cannot be empty")]
    Empty,
    #[error("'{0}' is not an OpenLibrary work id")]
    Invalid(String),
}

/// An OpenLibrary work identifier such as `OL45883W`.
///
/// Accepts either the bare id or a full work key (`/works/OL45883W`).
///
/// ```
/// use booksearch_core::WorkId;
///
/// let id = WorkId::parse("/works/OL45883W").unwrap();
/// assert_eq!(id.as_str(), "OL45883W");
/// assert!(WorkId::parse("../etc/passwd").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WorkId(String);

impl WorkId {
    /// Parse a bare work id or a `/works/...` key.
    ///
    /// # Errors
    ///
    /// Returns [`WorkIdError`] unless the id is `OL`, one or more digits, then `W`.
    pub fn parse(input: &str) -> Result<Self, WorkIdError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(WorkIdError::Empty);
        }
        let id = trimmed.strip_prefix("/works/").unwrap_or(trimmed);

        let digits = id
            .strip_prefix("OL")
            .and_then(|rest| rest.strip_suffix('W'))
            .filter(|d| !d.is_empty() && d.bytes().all(|b| b.is_ascii_digit()));

        match digits {
            Some(_) => Ok(Self(id.to_owned())),
            None => Err(WorkIdError::Invalid(trimmed.to_owned())),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The full catalog key, `/works/<id>`.
    #[must_use]
    pub fn key(&self) -> String {
        format!("/works/{}", self.0)
    }
}

impl fmt::Display for WorkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for WorkId {
    type Error = WorkIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<WorkId> for String {
    fn from(id: WorkId) -> Self {
        id.0
    }
}

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(rename = "numFound", default)]
    pub num_found: u64,
    #[serde(default)]
    pub docs: Vec<CatalogItem>,
}

/// Extended information about a work.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkDetails {
    #[serde(default)]
    pub title: Option<String>,
    /// Upstream sends either a string or `{ "type": ..., "value": ... }`.
    #[serde(
        default,
        deserialize_with = "deserialize_description",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub covers: Vec<i64>,
}

impl WorkDetails {
    /// Description text, or [`NO_DESCRIPTION`].
    #[must_use]
    pub fn description_or_default(&self) -> &str {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(NO_DESCRIPTION)
    }

    /// Subjects to show, capped at [`MAX_DISPLAYED_SUBJECTS`].
    #[must_use]
    pub fn displayed_subjects(&self) -> &[String] {
        let end = self.subjects.len().min(MAX_DISPLAYED_SUBJECTS);
        self.subjects.get(..end).unwrap_or_default()
    }

    /// First cover id with a real image (upstream uses `-1` for none).
    #[must_use]
    pub fn primary_cover(&self) -> Option<i64> {
        self.covers.iter().copied().find(|id| *id > 0)
    }
}

fn deserialize_description<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Description {
        Text(String),
        Typed { value: String },
    }

    let description = Option::<Description>::deserialize(deserializer)?;
    Ok(description.map(|d| match d {
        Description::Text(text) | Description::Typed { value: text } => text,
    }))
}
