//! In-process user repository.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::user::{EmailAddress, User, UserId, Username};

/// Mutex-guarded user store.
///
/// The whole map sits behind one lock, which makes `get_or_create` and
/// the uniqueness checks atomic: concurrent identical sign-ups converge
/// on the same row.
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    inner: Mutex<HashMap<UserId, User>>,
}

impl MemoryUserRepository {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `users`. Used to seed bootstrap
    /// accounts at startup and fixtures in tests.
    #[must_use]
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let map = users.into_iter().map(|user| (user.id(), user)).collect();
        Self {
            inner: Mutex::new(map),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<UserId, User>>, UserRepositoryError> {
        self.inner
            .lock()
            .map_err(|_| UserRepositoryError::backend("user store lock poisoned"))
    }

    fn check_unique(
        map: &HashMap<UserId, User>,
        candidate: &User,
    ) -> Result<(), UserRepositoryError> {
        for existing in map.values() {
            if existing.id() == candidate.id() {
                continue;
            }
            if existing.username() == candidate.username() {
                return Err(UserRepositoryError::UsernameTaken);
            }
            if existing.email() == candidate.email() {
                return Err(UserRepositoryError::EmailTaken);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn get_or_create(
        &self,
        username: &Username,
        email: &EmailAddress,
    ) -> Result<(User, bool), UserRepositoryError> {
        let mut map = self.lock()?;
        for existing in map.values() {
            let username_matches = existing.username() == username;
            let email_matches = existing.email() == email;
            match (username_matches, email_matches) {
                (true, true) => return Ok((existing.clone(), false)),
                (true, false) => return Err(UserRepositoryError::UsernameTaken),
                (false, true) => return Err(UserRepositoryError::EmailTaken),
                (false, false) => {}
            }
        }
        let user = User::signup(username.clone(), email.clone());
        map.insert(user.id(), user.clone());
        Ok((user, true))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.lock()?.get(&id).cloned())
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserRepositoryError> {
        Ok(self
            .lock()?
            .values()
            .find(|user| user.username() == username)
            .cloned())
    }

    async fn insert(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut map = self.lock()?;
        Self::check_unique(&map, user)?;
        map.insert(user.id(), user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut map = self.lock()?;
        if !map.contains_key(&user.id()) {
            return Err(UserRepositoryError::backend("user not found"));
        }
        Self::check_unique(&map, user)?;
        map.insert(user.id(), user.clone());
        Ok(())
    }

    async fn delete(&self, id: UserId) -> Result<bool, UserRepositoryError> {
        Ok(self.lock()?.remove(&id).is_some())
    }

    async fn list<'a>(&self, search: Option<&'a str>) -> Result<Vec<User>, UserRepositoryError> {
        let map = self.lock()?;
        let mut users: Vec<User> = map
            .values()
            .filter(|user| {
                // Case-insensitive, matching the catalogue searches.
                search.is_none_or(|needle| {
                    user.username()
                        .as_str()
                        .to_lowercase()
                        .contains(&needle.to_lowercase())
                })
            })
            .cloned()
            .collect();
        users.sort_by(|a, b| a.username().as_str().cmp(b.username().as_str()));
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn username(raw: &str) -> Username {
        Username::try_from(raw.to_owned()).expect("valid username")
    }

    fn email(raw: &str) -> EmailAddress {
        EmailAddress::try_from(raw.to_owned()).expect("valid email")
    }

    #[tokio::test]
    async fn get_or_create_is_idempotent_for_the_same_pair() {
        let repo = MemoryUserRepository::new();

        let (first, created) = repo
            .get_or_create(&username("alice"), &email("alice@example.com"))
            .await
            .expect("first call succeeds");
        assert!(created);

        let (second, created) = repo
            .get_or_create(&username("alice"), &email("alice@example.com"))
            .await
            .expect("second call succeeds");
        assert!(!created);
        assert_eq!(first.id(), second.id());
    }

    #[rstest]
    #[case("alice", "other@example.com", UserRepositoryError::UsernameTaken)]
    #[case("other", "alice@example.com", UserRepositoryError::EmailTaken)]
    #[tokio::test]
    async fn get_or_create_rejects_partial_collisions(
        #[case] name: &str,
        #[case] address: &str,
        #[case] expected: UserRepositoryError,
    ) {
        let repo = MemoryUserRepository::new();
        repo.get_or_create(&username("alice"), &email("alice@example.com"))
            .await
            .expect("seed user");

        let error = repo
            .get_or_create(&username(name), &email(address))
            .await
            .expect_err("collision rejected");
        assert_eq!(error, expected);
    }

    #[tokio::test]
    async fn update_rejects_stealing_another_users_email() {
        let repo = MemoryUserRepository::new();
        repo.get_or_create(&username("alice"), &email("alice@example.com"))
            .await
            .expect("seed alice");
        let (mut bob, _) = repo
            .get_or_create(&username("bob"), &email("bob@example.com"))
            .await
            .expect("seed bob");

        bob.apply_update(crate::domain::user::UserUpdate {
            email: Some(email("alice@example.com")),
            ..crate::domain::user::UserUpdate::default()
        });
        let error = repo.update(&bob).await.expect_err("conflict rejected");
        assert_eq!(error, UserRepositoryError::EmailTaken);
    }

    #[tokio::test]
    async fn list_filters_by_username_substring_and_sorts() {
        let repo = MemoryUserRepository::new();
        for (name, address) in [
            ("carol", "carol@example.com"),
            ("alice", "alice@example.com"),
            ("alina", "alina@example.com"),
        ] {
            repo.get_or_create(&username(name), &email(address))
                .await
                .expect("seed user");
        }

        let all = repo.list(None).await.expect("list succeeds");
        let names: Vec<&str> = all.iter().map(|u| u.username().as_str()).collect();
        assert_eq!(names, vec!["alice", "alina", "carol"]);

        let filtered = repo.list(Some("ali")).await.expect("filtered list");
        let names: Vec<&str> = filtered.iter().map(|u| u.username().as_str()).collect();
        assert_eq!(names, vec!["alice", "alina"]);
    }

    #[tokio::test]
    async fn list_search_ignores_case() {
        let repo = MemoryUserRepository::new();
        repo.get_or_create(&username("alice"), &email("alice@example.com"))
            .await
            .expect("seed user");

        let filtered = repo.list(Some("ALI")).await.expect("filtered list");
        let names: Vec<&str> = filtered.iter().map(|u| u.username().as_str()).collect();
        assert_eq!(names, vec!["alice"]);
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_matched() {
        let repo = MemoryUserRepository::new();
        let (user, _) = repo
            .get_or_create(&username("alice"), &email("alice@example.com"))
            .await
            .expect("seed user");

        assert!(repo.delete(user.id()).await.expect("delete succeeds"));
        assert!(!repo.delete(user.id()).await.expect("second delete"));
    }
}
