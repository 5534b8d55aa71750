//! In-memory user repository for fixture mode and tests.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::{ProfileUpdate, UserPersistenceError, UserRepository};
use crate::domain::{User, UserId, UserSummary, Username, UsernamePrefix};

/// User repository holding rows in a mutex-guarded vector.
///
/// Mirrors the relational store closely enough for the service: usernames
/// are unique and search results are ordered by username.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    /// Empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository seeded with `users`.
    ///
    /// # Errors
    ///
    /// Returns [`UserPersistenceError::DuplicateUsername`] when two seeds
    /// share a username.
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Result<Self, UserPersistenceError> {
        let repository = Self::new();
        for user in users {
            repository.insert(user)?;
        }
        Ok(repository)
    }

    /// Insert or replace a user.
    ///
    /// # Errors
    ///
    /// Returns [`UserPersistenceError::DuplicateUsername`] when another user
    /// already holds the username.
    pub fn insert(&self, user: User) -> Result<(), UserPersistenceError> {
        let mut users = self.lock();
        ensure_username_free(&users, user.id(), user.username())?;
        users.retain(|existing| existing.id() != user.id());
        users.push(user);
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<User>> {
        // A panic mid-update leaves whole `User` values behind, so the data
        // is still consistent.
        self.users.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn ensure_username_free(
    users: &[User],
    id: &UserId,
    username: &Username,
) -> Result<(), UserPersistenceError> {
    if users
        .iter()
        .any(|other| other.id() != id && other.username() == username)
    {
        return Err(UserPersistenceError::duplicate_username(username.as_ref()));
    }
    Ok(())
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.lock().iter().find(|user| user.id() == id).cloned())
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .lock()
            .iter()
            .find(|user| user.username() == username)
            .cloned())
    }

    async fn apply_profile_update(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut users = self.lock();
        if let ProfileUpdate::Username(username) = update {
            ensure_username_free(&users, id, username)?;
        }
        let Some(slot) = users.iter_mut().find(|user| user.id() == id) else {
            return Ok(None);
        };
        *slot = update.apply_to(slot.clone());
        Ok(Some(slot.clone()))
    }

    async fn search_by_username_prefix(
        &self,
        prefix: &UsernamePrefix,
        limit: usize,
    ) -> Result<Vec<UserSummary>, UserPersistenceError> {
        let mut found: Vec<UserSummary> = self
            .lock()
            .iter()
            .filter(|user| prefix.matches(user.username()))
            .map(User::summary)
            .collect();
        found.sort_by(|a, b| a.username.as_ref().cmp(b.username.as_ref()));
        found.truncate(limit);
        Ok(found)
    }
}
