//! In-process review and comment repository.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::catalogue::TitleId;
use crate::domain::ports::{ReviewRepository, ReviewRepositoryError};
use crate::domain::review::{Comment, CommentId, Review, ReviewId};

#[derive(Debug, Default)]
struct ReviewState {
    reviews: HashMap<ReviewId, Review>,
    comments: HashMap<CommentId, Comment>,
}

impl ReviewState {
    fn drop_review(&mut self, id: ReviewId) -> bool {
        if self.reviews.remove(&id).is_none() {
            return false;
        }
        self.comments.retain(|_, comment| comment.review != id);
        true
    }
}

/// Mutex-guarded review store. Deleting a review drops its comments in
/// the same critical section.
#[derive(Debug, Default)]
pub struct MemoryReviewRepository {
    inner: Mutex<ReviewState>,
}

impl MemoryReviewRepository {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, ReviewState>, ReviewRepositoryError> {
        self.inner
            .lock()
            .map_err(|_| ReviewRepositoryError::backend("review store lock poisoned"))
    }
}

#[async_trait]
impl ReviewRepository for MemoryReviewRepository {
    async fn list_reviews(&self, title: TitleId) -> Result<Vec<Review>, ReviewRepositoryError> {
        let state = self.lock()?;
        let mut reviews: Vec<Review> = state
            .reviews
            .values()
            .filter(|review| review.title == title)
            .cloned()
            .collect();
        reviews.sort_by_key(|review| review.pub_date);
        Ok(reviews)
    }

    async fn find_review(&self, id: ReviewId) -> Result<Option<Review>, ReviewRepositoryError> {
        Ok(self.lock()?.reviews.get(&id).cloned())
    }

    async fn insert_review(&self, review: &Review) -> Result<(), ReviewRepositoryError> {
        let mut state = self.lock()?;
        let duplicate = state.reviews.values().any(|existing| {
            existing.title == review.title && existing.author == review.author
        });
        if duplicate {
            return Err(ReviewRepositoryError::DuplicateReview);
        }
        state.reviews.insert(review.id, review.clone());
        Ok(())
    }

    async fn update_review(&self, review: &Review) -> Result<(), ReviewRepositoryError> {
        let mut state = self.lock()?;
        if !state.reviews.contains_key(&review.id) {
            return Err(ReviewRepositoryError::backend("review not found"));
        }
        state.reviews.insert(review.id, review.clone());
        Ok(())
    }

    async fn delete_review(&self, id: ReviewId) -> Result<bool, ReviewRepositoryError> {
        Ok(self.lock()?.drop_review(id))
    }

    async fn delete_reviews_for_title(
        &self,
        title: TitleId,
    ) -> Result<(), ReviewRepositoryError> {
        let mut state = self.lock()?;
        let doomed: Vec<ReviewId> = state
            .reviews
            .values()
            .filter(|review| review.title == title)
            .map(|review| review.id)
            .collect();
        for id in doomed {
            state.drop_review(id);
        }
        Ok(())
    }

    async fn list_comments(
        &self,
        review: ReviewId,
    ) -> Result<Vec<Comment>, ReviewRepositoryError> {
        let state = self.lock()?;
        let mut comments: Vec<Comment> = state
            .comments
            .values()
            .filter(|comment| comment.review == review)
            .cloned()
            .collect();
        comments.sort_by_key(|comment| comment.pub_date);
        Ok(comments)
    }

    async fn find_comment(
        &self,
        id: CommentId,
    ) -> Result<Option<Comment>, ReviewRepositoryError> {
        Ok(self.lock()?.comments.get(&id).cloned())
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<(), ReviewRepositoryError> {
        self.lock()?.comments.insert(comment.id, comment.clone());
        Ok(())
    }

    async fn update_comment(&self, comment: &Comment) -> Result<(), ReviewRepositoryError> {
        let mut state = self.lock()?;
        if !state.comments.contains_key(&comment.id) {
            return Err(ReviewRepositoryError::backend("comment not found"));
        }
        state.comments.insert(comment.id, comment.clone());
        Ok(())
    }

    async fn delete_comment(&self, id: CommentId) -> Result<bool, ReviewRepositoryError> {
        Ok(self.lock()?.comments.remove(&id).is_some())
    }
}
