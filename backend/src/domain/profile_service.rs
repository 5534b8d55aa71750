//! Profile update service.
//!
//! Implements [`ProfileCommand`] and [`UserSearchQuery`] on top of the
//! [`UserRepository`] and [`AvatarStore`] driven ports. Each operation is a
//! single read-validate-write sequence; concurrent updates of the same user
//! are not coordinated and the last write wins.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    AvatarStore, AvatarStoreError, ProfileCommand, ProfileUpdate, UserPersistenceError,
    UserRepository, UserSearchQuery,
};
use crate::domain::{
    AvatarFileName, AvatarPath, AvatarPolicy, AvatarUpload, Bio, Error, User, UserId,
    UserSummary, Username, UsernamePrefix,
};

/// Maximum number of users returned by a search.
pub const SEARCH_RESULT_LIMIT: usize = 5;

/// Profile service implementing the driving ports.
pub struct ProfileService<R, A> {
    users: Arc<R>,
    avatars: Arc<A>,
    policy: AvatarPolicy,
}

impl<R, A> Clone for ProfileService<R, A> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            avatars: Arc::clone(&self.avatars),
            policy: self.policy.clone(),
        }
    }
}

impl<R, A> ProfileService<R, A> {
    /// Create a service over the given adapters.
    pub fn new(users: Arc<R>, avatars: Arc<A>, policy: AvatarPolicy) -> Self {
        Self {
            users,
            avatars,
            policy,
        }
    }

    /// Upload rules in force.
    pub fn policy(&self) -> &AvatarPolicy {
        &self.policy
    }
}

impl<R, A> ProfileService<R, A>
where
    R: UserRepository,
    A: AvatarStore,
{
    fn map_persistence_error(error: UserPersistenceError) -> Error {
        match error {
            UserPersistenceError::Connection { message } => {
                Error::service_unavailable(format!("user repository unavailable: {message}"))
            }
            UserPersistenceError::Query { message } => {
                Error::internal(format!("user repository error: {message}"))
            }
            UserPersistenceError::DuplicateUsername { .. } => Self::username_taken(),
        }
    }

    fn map_store_error(error: AvatarStoreError) -> Error {
        match error {
            AvatarStoreError::Io { message } => {
                Error::internal(format!("avatar storage error: {message}"))
            }
        }
    }

    fn username_taken() -> Error {
        Error::conflict("username is already taken").with_details(json!({
            "field": "username",
            "code": "username_taken",
        }))
    }

    fn user_not_found(user_id: &UserId) -> Error {
        Error::not_found(format!("user {user_id} not found"))
    }

    async fn load_user(&self, user_id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| Self::user_not_found(user_id))
    }

    async fn apply(&self, user_id: &UserId, update: &ProfileUpdate) -> Result<User, Error> {
        self.users
            .apply_profile_update(user_id, update)
            .await
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| Self::user_not_found(user_id))
    }

    async fn discard(&self, name: &AvatarFileName, reason: &str) {
        if let Err(err) = self.avatars.remove(name).await {
            warn!(file = %name, error = %err, reason, "failed to remove avatar file");
        }
    }

    async fn prune_previous(&self, previous: Option<&AvatarPath>, current: &User) {
        let Some(previous) = previous else {
            return;
        };
        if current.avatar() == Some(previous) {
            return;
        }
        // Paths outside the managed prefix were not written by this service.
        let Some(name) = self.policy.file_name_for(previous) else {
            return;
        };
        self.discard(&name, "replaced").await;
    }
}

#[async_trait]
impl<R, A> ProfileCommand for ProfileService<R, A>
where
    R: UserRepository,
    A: AvatarStore,
{
    async fn update_avatar(&self, user_id: &UserId, upload: AvatarUpload) -> Result<User, Error> {
        let media_type = self.policy.check(&upload)?;
        let previous = self.load_user(user_id).await?.avatar().cloned();

        let extension = media_type.extension_for(upload.file_name());
        let name = AvatarFileName::generate(&extension);
        let bytes = upload.len();
        self.avatars
            .store(&name, upload.into_data())
            .await
            .map_err(Self::map_store_error)?;

        let path = self.policy.path_for(&name);
        let user = match self.apply(user_id, &ProfileUpdate::Avatar(path)).await {
            Ok(user) => user,
            Err(err) => {
                self.discard(&name, "profile update failed").await;
                return Err(err);
            }
        };

        if self.policy.prune_replaced() {
            self.prune_previous(previous.as_ref(), &user).await;
        }
        info!(user_id = %user_id, file = %name, bytes, "avatar updated");
        Ok(user)
    }

    async fn update_bio(&self, user_id: &UserId, bio: Option<Bio>) -> Result<User, Error> {
        let user = self.apply(user_id, &ProfileUpdate::Bio(bio)).await?;
        info!(user_id = %user_id, "bio updated");
        Ok(user)
    }

    async fn update_username(&self, user_id: &UserId, username: Username) -> Result<User, Error> {
        let holder = self
            .users
            .find_by_username(&username)
            .await
            .map_err(Self::map_persistence_error)?;
        if holder.is_some_and(|other| other.id() != user_id) {
            return Err(Self::username_taken());
        }

        let user = self
            .apply(user_id, &ProfileUpdate::Username(username))
            .await?;
        info!(user_id = %user_id, username = %user.username(), "username updated");
        Ok(user)
    }
}

#[async_trait]
impl<R, A> UserSearchQuery for ProfileService<R, A>
where
    R: UserRepository,
    A: AvatarStore,
{
    async fn search(&self, prefix: &UsernamePrefix) -> Result<Vec<UserSummary>, Error> {
        let mut found = self
            .users
            .search_by_username_prefix(prefix, SEARCH_RESULT_LIMIT)
            .await
            .map_err(Self::map_persistence_error)?;
        found.truncate(SEARCH_RESULT_LIMIT);
        Ok(found)
    }
}

#[cfg(test)]
#[path = "profile_service_tests.rs"]
mod tests;
