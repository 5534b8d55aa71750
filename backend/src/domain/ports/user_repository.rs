//! Driven port for user persistence adapters and their errors.

use async_trait::async_trait;

use crate::domain::{AvatarPath, Bio, User, UserId, UserSummary, Username, UsernamePrefix};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// The store's unique index rejected a username.
        DuplicateUsername { username: String } => "username already exists: {username}",
    }
}

/// Single-column profile mutation applied by [`UserRepository::apply_profile_update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileUpdate {
    /// Point the avatar at a newly stored file.
    Avatar(AvatarPath),
    /// Replace or clear the bio.
    Bio(Option<Bio>),
    /// Rename the user.
    Username(Username),
}

impl ProfileUpdate {
    /// Apply the mutation to an in-memory user.
    pub fn apply_to(&self, user: User) -> User {
        match self {
            Self::Avatar(path) => user.with_avatar(Some(path.clone())),
            Self::Bio(bio) => user.with_bio(bio.clone()),
            Self::Username(username) => user.with_username(username.clone()),
        }
    }
}

/// Storage for user profiles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch the user holding exactly `username`.
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Persist `update` for `id` and return the refreshed row.
    ///
    /// Returns `Ok(None)` when no user with `id` exists. Adapters report a
    /// unique index violation as [`UserPersistenceError::DuplicateUsername`].
    async fn apply_profile_update(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Users whose username starts with `prefix`, ignoring case.
    async fn search_by_username_prefix(
        &self,
        prefix: &UsernamePrefix,
        limit: usize,
    ) -> Result<Vec<UserSummary>, UserPersistenceError>;
}
