//! Catalogue entities: titles, categories and genres.

use std::fmt;
use std::sync::OnceLock;

use chrono::{Datelike, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors for catalogue components.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogueValidationError {
    /// Name was empty once trimmed.
    #[error("name must not be empty")]
    EmptyName,
    /// Name exceeds the storage limit.
    #[error("name must be at most {max} characters")]
    NameTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Slug was empty.
    #[error("slug must not be empty")]
    EmptySlug,
    /// Slug exceeds the storage limit.
    #[error("slug must be at most {max} characters")]
    SlugTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Slug contains characters outside `[-a-zA-Z0-9_]`.
    #[error("slug may only contain latin letters, digits, hyphens and underscores")]
    SlugInvalidCharacters,
    /// Titles cannot be dated in the future.
    #[error("year must not be later than {max}")]
    YearInFuture {
        /// Current calendar year at validation time.
        max: i32,
    },
}

/// Maximum catalogue name length.
pub const NAME_MAX: usize = 256;
/// Maximum slug length.
pub const SLUG_MAX: usize = 50;

static SLUG_RE: OnceLock<Regex> = OnceLock::new();

fn slug_regex() -> &'static Regex {
    SLUG_RE.get_or_init(|| {
        Regex::new("^[-a-zA-Z0-9_]+$")
            .unwrap_or_else(|error| panic!("slug regex failed to compile: {error}"))
    })
}

/// URL-safe identifier for categories and genres.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    /// Validate and construct a [`Slug`].
    pub fn new(slug: impl Into<String>) -> Result<Self, CatalogueValidationError> {
        let raw = slug.into();
        if raw.is_empty() {
            return Err(CatalogueValidationError::EmptySlug);
        }
        if raw.chars().count() > SLUG_MAX {
            return Err(CatalogueValidationError::SlugTooLong { max: SLUG_MAX });
        }
        if !slug_regex().is_match(&raw) {
            return Err(CatalogueValidationError::SlugInvalidCharacters);
        }
        Ok(Self(raw))
    }

    /// Borrow the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Slug> for String {
    fn from(value: Slug) -> Self {
        value.0
    }
}

impl TryFrom<String> for Slug {
    type Error = CatalogueValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Display name for catalogue entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CatalogueName(String);

impl CatalogueName {
    /// Validate and construct a [`CatalogueName`].
    pub fn new(name: impl Into<String>) -> Result<Self, CatalogueValidationError> {
        let raw = name.into();
        if raw.trim().is_empty() {
            return Err(CatalogueValidationError::EmptyName);
        }
        if raw.chars().count() > NAME_MAX {
            return Err(CatalogueValidationError::NameTooLong { max: NAME_MAX });
        }
        Ok(Self(raw))
    }

    /// Borrow the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for CatalogueName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<CatalogueName> for String {
    fn from(value: CatalogueName) -> Self {
        value.0
    }
}

impl TryFrom<String> for CatalogueName {
    type Error = CatalogueValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Release year; never later than the current calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct TitleYear(i32);

impl TitleYear {
    /// Validate and construct a [`TitleYear`].
    pub fn new(year: i32) -> Result<Self, CatalogueValidationError> {
        let max = Utc::now().year();
        if year > max {
            return Err(CatalogueValidationError::YearInFuture { max });
        }
        Ok(Self(year))
    }

    /// The year as a plain integer.
    #[must_use]
    pub const fn get(&self) -> i32 {
        self.0
    }
}

impl From<TitleYear> for i32 {
    fn from(value: TitleYear) -> Self {
        value.0
    }
}

impl TryFrom<i32> for TitleYear {
    type Error = CatalogueValidationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Grouping for titles, looked up by slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Display name.
    pub name: CatalogueName,
    /// Unique lookup key.
    pub slug: Slug,
}

/// Genre tag for titles, looked up by slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genre {
    /// Display name.
    pub name: CatalogueName,
    /// Unique lookup key.
    pub slug: Slug,
}

/// Stable title identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TitleId(Uuid);

impl TitleId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for TitleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TitleId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A reviewable work in the catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title {
    /// Stable identifier.
    pub id: TitleId,
    /// Display name.
    pub name: CatalogueName,
    /// Release year.
    pub year: TitleYear,
    /// Optional synopsis.
    pub description: Option<String>,
    /// Owning category slug.
    pub category: Slug,
    /// Genre slugs attached to the title.
    pub genres: Vec<Slug>,
}

impl Title {
    /// Create a title with a fresh identifier.
    #[must_use]
    pub fn new(
        name: CatalogueName,
        year: TitleYear,
        description: Option<String>,
        category: Slug,
        genres: Vec<Slug>,
    ) -> Self {
        Self {
            id: TitleId::random(),
            name,
            year,
            description,
            category,
            genres,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("film-noir")]
    #[case("sci_fi2")]
    fn slug_accepts_url_safe_input(#[case] raw: &str) {
        assert_eq!(Slug::new(raw).expect("valid slug").as_str(), raw);
    }

    #[rstest]
    #[case("", CatalogueValidationError::EmptySlug)]
    #[case("нет", CatalogueValidationError::SlugInvalidCharacters)]
    #[case("has space", CatalogueValidationError::SlugInvalidCharacters)]
    fn slug_rejects_invalid_input(#[case] raw: &str, #[case] expected: CatalogueValidationError) {
        assert_eq!(Slug::new(raw).expect_err("invalid slug"), expected);
    }

    #[rstest]
    fn slug_rejects_overlong_input() {
        let raw = "a".repeat(SLUG_MAX + 1);
        assert_eq!(
            Slug::new(raw).expect_err("overlong slug"),
            CatalogueValidationError::SlugTooLong { max: SLUG_MAX }
        );
    }

    #[rstest]
    fn year_accepts_the_current_year_but_not_the_next() {
        let current = Utc::now().year();
        assert_eq!(TitleYear::new(current).expect("current year").get(), current);
        assert_eq!(
            TitleYear::new(current + 1).expect_err("future year"),
            CatalogueValidationError::YearInFuture { max: current }
        );
    }

    #[rstest]
    fn year_accepts_the_distant_past() {
        assert!(TitleYear::new(-500).is_ok());
    }
}
