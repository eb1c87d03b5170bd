//! In-process catalogue repository.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::catalogue::{Category, Genre, Slug, Title, TitleId};
use crate::domain::ports::{CatalogueRepository, CatalogueRepositoryError, TitleFilter};

#[derive(Debug, Default)]
struct CatalogueState {
    // Keyed by slug; BTreeMap keeps listings in slug order for free.
    categories: BTreeMap<String, Category>,
    genres: BTreeMap<String, Genre>,
    titles: HashMap<TitleId, Title>,
}

/// Mutex-guarded catalogue store.
#[derive(Debug, Default)]
pub struct MemoryCatalogueRepository {
    inner: Mutex<CatalogueState>,
}

impl MemoryCatalogueRepository {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, CatalogueState>, CatalogueRepositoryError> {
        self.inner
            .lock()
            .map_err(|_| CatalogueRepositoryError::backend("catalogue store lock poisoned"))
    }

    // Searches are case-insensitive substring matches, like the name
    // filter on titles.
    fn name_matches(name: &str, search: Option<&str>) -> bool {
        search.is_none_or(|needle| name.to_lowercase().contains(&needle.to_lowercase()))
    }

    fn matches(filter: &TitleFilter, title: &Title) -> bool {
        if let Some(category) = &filter.category
            && &title.category != category
        {
            return false;
        }
        if let Some(genre) = &filter.genre
            && !title.genres.contains(genre)
        {
            return false;
        }
        if let Some(name) = &filter.name {
            let haystack = title.name.as_str().to_lowercase();
            if !haystack.contains(&name.to_lowercase()) {
                return false;
            }
        }
        if let Some(year) = filter.year
            && title.year.get() != year
        {
            return false;
        }
        true
    }
}

#[async_trait]
impl CatalogueRepository for MemoryCatalogueRepository {
    async fn list_categories<'a>(
        &self,
        search: Option<&'a str>,
    ) -> Result<Vec<Category>, CatalogueRepositoryError> {
        let state = self.lock()?;
        Ok(state
            .categories
            .values()
            .filter(|category| Self::name_matches(category.name.as_str(), search))
            .cloned()
            .collect())
    }

    async fn find_category(
        &self,
        slug: &Slug,
    ) -> Result<Option<Category>, CatalogueRepositoryError> {
        Ok(self.lock()?.categories.get(slug.as_str()).cloned())
    }

    async fn insert_category(&self, category: &Category) -> Result<(), CatalogueRepositoryError> {
        let mut state = self.lock()?;
        if state.categories.contains_key(category.slug.as_str()) {
            return Err(CatalogueRepositoryError::SlugTaken);
        }
        state
            .categories
            .insert(category.slug.as_str().to_owned(), category.clone());
        Ok(())
    }

    async fn delete_category(&self, slug: &Slug) -> Result<bool, CatalogueRepositoryError> {
        Ok(self.lock()?.categories.remove(slug.as_str()).is_some())
    }

    async fn list_genres<'a>(
        &self,
        search: Option<&'a str>,
    ) -> Result<Vec<Genre>, CatalogueRepositoryError> {
        let state = self.lock()?;
        Ok(state
            .genres
            .values()
            .filter(|genre| Self::name_matches(genre.name.as_str(), search))
            .cloned()
            .collect())
    }

    async fn find_genre(&self, slug: &Slug) -> Result<Option<Genre>, CatalogueRepositoryError> {
        Ok(self.lock()?.genres.get(slug.as_str()).cloned())
    }

    async fn insert_genre(&self, genre: &Genre) -> Result<(), CatalogueRepositoryError> {
        let mut state = self.lock()?;
        if state.genres.contains_key(genre.slug.as_str()) {
            return Err(CatalogueRepositoryError::SlugTaken);
        }
        state
            .genres
            .insert(genre.slug.as_str().to_owned(), genre.clone());
        Ok(())
    }

    async fn delete_genre(&self, slug: &Slug) -> Result<bool, CatalogueRepositoryError> {
        Ok(self.lock()?.genres.remove(slug.as_str()).is_some())
    }

    async fn list_titles(
        &self,
        filter: &TitleFilter,
    ) -> Result<Vec<Title>, CatalogueRepositoryError> {
        let state = self.lock()?;
        let mut titles: Vec<Title> = state
            .titles
            .values()
            .filter(|title| Self::matches(filter, title))
            .cloned()
            .collect();
        titles.sort_by(|a, b| a.name.as_str().cmp(b.name.as_str()));
        Ok(titles)
    }

    async fn find_title(&self, id: TitleId) -> Result<Option<Title>, CatalogueRepositoryError> {
        Ok(self.lock()?.titles.get(&id).cloned())
    }

    async fn insert_title(&self, title: &Title) -> Result<(), CatalogueRepositoryError> {
        self.lock()?.titles.insert(title.id, title.clone());
        Ok(())
    }

    async fn update_title(&self, title: &Title) -> Result<(), CatalogueRepositoryError> {
        let mut state = self.lock()?;
        if !state.titles.contains_key(&title.id) {
            return Err(CatalogueRepositoryError::backend("title not found"));
        }
        state.titles.insert(title.id, title.clone());
        Ok(())
    }

    async fn delete_title(&self, id: TitleId) -> Result<bool, CatalogueRepositoryError> {
        Ok(self.lock()?.titles.remove(&id).is_some())
    }
}
