//! Driving port for profile mutations.
//!
//! HTTP handlers call [`ProfileCommand`] with the id of the authenticated
//! user. Every method returns the refreshed user on success.

use async_trait::async_trait;

use crate::domain::{AvatarUpload, Bio, Error, User, UserId, Username};

/// Profile mutations available to the current user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileCommand: Send + Sync {
    /// Validate and store a new avatar image.
    ///
    /// # Errors
    ///
    /// - `InvalidMediaType` when the declared type is not JPEG or PNG.
    /// - `PayloadTooLarge` when the upload exceeds the configured limit.
    /// - `NotFound` when the user no longer exists.
    async fn update_avatar(&self, user_id: &UserId, upload: AvatarUpload) -> Result<User, Error>;

    /// Replace or clear the bio.
    async fn update_bio(&self, user_id: &UserId, bio: Option<Bio>) -> Result<User, Error>;

    /// Rename the user.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` when another user already holds `username`.
    async fn update_username(&self, user_id: &UserId, username: Username) -> Result<User, Error>;
}
