//! Driven port for catalogue persistence.

use async_trait::async_trait;

use crate::domain::catalogue::{Category, Genre, Slug, Title, TitleId};

/// Persistence errors raised by catalogue repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogueRepositoryError {
    /// A category or genre with this slug already exists.
    #[error("slug taken")]
    SlugTaken,
    /// Storage failure outside the domain's control.
    #[error("catalogue repository failure: {message}")]
    Backend {
        /// Adapter-supplied failure description.
        message: String,
    },
}

impl CatalogueRepositoryError {
    /// Helper for backend failures.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Filter terms for title listings. Empty filters match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleFilter {
    /// Exact category slug.
    pub category: Option<Slug>,
    /// Slug of a genre the title must carry.
    pub genre: Option<Slug>,
    /// Case-insensitive name substring.
    pub name: Option<String>,
    /// Exact release year.
    pub year: Option<i32>,
}

/// Persistence port for categories, genres and titles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogueRepository: Send + Sync {
    /// List categories ordered by slug, optionally filtered by a name
    /// substring.
    async fn list_categories<'a>(
        &self,
        search: Option<&'a str>,
    ) -> Result<Vec<Category>, CatalogueRepositoryError>;

    /// Fetch a category by slug.
    async fn find_category(
        &self,
        slug: &Slug,
    ) -> Result<Option<Category>, CatalogueRepositoryError>;

    /// Insert a category; duplicate slugs surface as [`CatalogueRepositoryError::SlugTaken`].
    async fn insert_category(&self, category: &Category) -> Result<(), CatalogueRepositoryError>;

    /// Delete a category by slug; `false` when no row matched.
    async fn delete_category(&self, slug: &Slug) -> Result<bool, CatalogueRepositoryError>;

    /// List genres ordered by slug, optionally filtered by a name substring.
    async fn list_genres<'a>(
        &self,
        search: Option<&'a str>,
    ) -> Result<Vec<Genre>, CatalogueRepositoryError>;

    /// Fetch a genre by slug.
    async fn find_genre(&self, slug: &Slug) -> Result<Option<Genre>, CatalogueRepositoryError>;

    /// Insert a genre; duplicate slugs surface as [`CatalogueRepositoryError::SlugTaken`].
    async fn insert_genre(&self, genre: &Genre) -> Result<(), CatalogueRepositoryError>;

    /// Delete a genre by slug; `false` when no row matched.
    async fn delete_genre(&self, slug: &Slug) -> Result<bool, CatalogueRepositoryError>;

    /// List titles matching the filter, ordered by name.
    async fn list_titles(
        &self,
        filter: &TitleFilter,
    ) -> Result<Vec<Title>, CatalogueRepositoryError>;

    /// Fetch a title by identifier.
    async fn find_title(&self, id: TitleId) -> Result<Option<Title>, CatalogueRepositoryError>;

    /// Insert a new title.
    async fn insert_title(&self, title: &Title) -> Result<(), CatalogueRepositoryError>;

    /// Replace the stored title matching `title.id`.
    async fn update_title(&self, title: &Title) -> Result<(), CatalogueRepositoryError>;

    /// Delete a title by identifier; `false` when no row matched.
    async fn delete_title(&self, id: TitleId) -> Result<bool, CatalogueRepositoryError>;
}
