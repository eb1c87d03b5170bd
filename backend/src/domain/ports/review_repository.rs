//! Driven port for review and comment persistence.

use async_trait::async_trait;

use crate::domain::catalogue::TitleId;
use crate::domain::review::{Comment, CommentId, Review, ReviewId};

/// Persistence errors raised by review repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviewRepositoryError {
    /// The author already reviewed this title.
    #[error("duplicate review")]
    DuplicateReview,
    /// Storage failure outside the domain's control.
    #[error("review repository failure: {message}")]
    Backend {
        /// Adapter-supplied failure description.
        message: String,
    },
}

impl ReviewRepositoryError {
    /// Helper for backend failures.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Persistence port for reviews and their comments.
///
/// Deleting a review removes its comments; deleting all reviews for a
/// title cascades the same way.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// List reviews for a title ordered by publication date.
    async fn list_reviews(&self, title: TitleId) -> Result<Vec<Review>, ReviewRepositoryError>;

    /// Fetch a review by identifier.
    async fn find_review(&self, id: ReviewId) -> Result<Option<Review>, ReviewRepositoryError>;

    /// Insert a review; a second review by the same author for the same
    /// title surfaces as [`ReviewRepositoryError::DuplicateReview`].
    async fn insert_review(&self, review: &Review) -> Result<(), ReviewRepositoryError>;

    /// Replace the stored review matching `review.id`.
    async fn update_review(&self, review: &Review) -> Result<(), ReviewRepositoryError>;

    /// Delete a review and its comments; `false` when no row matched.
    async fn delete_review(&self, id: ReviewId) -> Result<bool, ReviewRepositoryError>;

    /// Delete every review (and comment) attached to a title.
    async fn delete_reviews_for_title(
        &self,
        title: TitleId,
    ) -> Result<(), ReviewRepositoryError>;

    /// List comments on a review ordered by publication date.
    async fn list_comments(
        &self,
        review: ReviewId,
    ) -> Result<Vec<Comment>, ReviewRepositoryError>;

    /// Fetch a comment by identifier.
    async fn find_comment(&self, id: CommentId)
        -> Result<Option<Comment>, ReviewRepositoryError>;

    /// Insert a comment.
    async fn insert_comment(&self, comment: &Comment) -> Result<(), ReviewRepositoryError>;

    /// Replace the stored comment matching `comment.id`.
    async fn update_comment(&self, comment: &Comment) -> Result<(), ReviewRepositoryError>;

    /// Delete a comment; `false` when no row matched.
    async fn delete_comment(&self, id: CommentId) -> Result<bool, ReviewRepositoryError>;
}
