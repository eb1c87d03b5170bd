//! Driven port for user persistence.

use async_trait::async_trait;

use crate::domain::user::{EmailAddress, User, UserId, Username};

/// Persistence errors raised by user repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserRepositoryError {
    /// Another user already holds this username (with a different email).
    #[error("username taken")]
    UsernameTaken,
    /// Another user already holds this email (with a different username).
    #[error("email taken")]
    EmailTaken,
    /// Storage failure outside the domain's control.
    #[error("user repository failure: {message}")]
    Backend {
        /// Adapter-supplied failure description.
        message: String,
    },
}

impl UserRepositoryError {
    /// Helper for backend failures.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Persistence port for user records.
///
/// `get_or_create` must be atomic with respect to concurrent identical
/// sign-ups: two racing calls with the same pair must yield the same row,
/// one of them with `created = true`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch or atomically create the user for an exact (username, email)
    /// pair. Partial collisions fail with the corresponding conflict
    /// variant before any row is created.
    async fn get_or_create(
        &self,
        username: &Username,
        email: &EmailAddress,
    ) -> Result<(User, bool), UserRepositoryError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch a user by username.
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// Insert a new record; uniqueness violations surface as conflicts.
    async fn insert(&self, user: &User) -> Result<(), UserRepositoryError>;

    /// Replace the stored record matching `user.id()`.
    async fn update(&self, user: &User) -> Result<(), UserRepositoryError>;

    /// Delete by identifier; `false` when no row matched.
    async fn delete(&self, id: UserId) -> Result<bool, UserRepositoryError>;

    /// List users ordered by username, optionally filtered by a username
    /// substring.
    async fn list<'a>(&self, search: Option<&'a str>) -> Result<Vec<User>, UserRepositoryError>;
}
