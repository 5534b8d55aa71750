//! User profile model and its validated field types.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Maximum username length in characters.
pub const USERNAME_MAX: usize = 16;
/// Maximum bio length in characters.
pub const BIO_MAX: usize = 255;
/// Maximum username search prefix length in characters.
pub const USERNAME_PREFIX_MAX: usize = 20;

/// Validation errors raised by the user field constructors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserValidationError {
    /// Identifier is not a UUID.
    #[error("user id must be a valid UUID")]
    InvalidId,
    /// Username is empty.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Username exceeds `max` characters.
    #[error("username must be at most {max} characters")]
    UsernameTooLong {
        /// Largest accepted length.
        max: usize,
    },
    /// Bio exceeds `max` characters.
    #[error("bio must be at most {max} characters")]
    BioTooLong {
        /// Largest accepted length.
        max: usize,
    },
    /// Search prefix is empty.
    #[error("search query must not be empty")]
    EmptySearchQuery,
    /// Search prefix exceeds `max` characters.
    #[error("search query must be at most {max} characters")]
    SearchQueryTooLong {
        /// Largest accepted length.
        max: usize,
    },
    /// Avatar path does not start with `/`.
    #[error("avatar path must be an absolute URL path")]
    InvalidAvatarPath,
}

impl UserValidationError {
    /// Stable machine-readable code used in error details.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidId => "invalid_user_id",
            Self::EmptyUsername => "empty_username",
            Self::UsernameTooLong { .. } => "username_too_long",
            Self::BioTooLong { .. } => "bio_too_long",
            Self::EmptySearchQuery => "empty_query",
            Self::SearchQueryTooLong { .. } => "query_too_long",
            Self::InvalidAvatarPath => "invalid_avatar_path",
        }
    }
}

/// Stable user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Parse an identifier from its textual UUID form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Wrap an already parsed UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

macro_rules! string_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = UserValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

string_newtype! {
    /// Unique handle chosen by the user, 1 to 16 characters.
    Username
}

impl Username {
    /// Validate and construct a username.
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let value = value.into();
        let length = value.chars().count();
        if length == 0 {
            return Err(UserValidationError::EmptyUsername);
        }
        if length > USERNAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        Ok(Self(value))
    }
}

string_newtype! {
    /// Free-form profile text, at most 255 characters.
    Bio
}

impl Bio {
    /// Validate and construct a bio.
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let value = value.into();
        if value.chars().count() > BIO_MAX {
            return Err(UserValidationError::BioTooLong { max: BIO_MAX });
        }
        Ok(Self(value))
    }
}

string_newtype! {
    /// Case-insensitive username prefix used by search, 1 to 20 characters.
    UsernamePrefix
}

impl UsernamePrefix {
    /// Validate and construct a search prefix.
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let value = value.into();
        let length = value.chars().count();
        if length == 0 {
            return Err(UserValidationError::EmptySearchQuery);
        }
        if length > USERNAME_PREFIX_MAX {
            return Err(UserValidationError::SearchQueryTooLong {
                max: USERNAME_PREFIX_MAX,
            });
        }
        Ok(Self(value))
    }

    /// Whether `username` starts with this prefix, ignoring case.
    pub fn matches(&self, username: &Username) -> bool {
        username
            .as_ref()
            .to_lowercase()
            .starts_with(&self.0.to_lowercase())
    }
}

string_newtype! {
    /// Server-relative URL path of a stored avatar, e.g. `/static/avatars/ab12.png`.
    AvatarPath
}

impl AvatarPath {
    /// Validate and construct an avatar path.
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let value = value.into();
        if !value.starts_with('/') || value.len() < 2 {
            return Err(UserValidationError::InvalidAvatarPath);
        }
        Ok(Self(value))
    }

    /// Paths built by the avatar policy always start with `/` and a file name.
    pub(crate) fn from_generated(value: String) -> Self {
        Self(value)
    }
}

/// Application user as seen by the profile service.
///
/// ## Invariants
/// - `username` holds 1 to 16 characters.
/// - `bio`, when present, holds at most 255 characters.
/// - `avatar`, when present, points at a file validated at upload time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: UserId,
    username: Username,
    bio: Option<Bio>,
    avatar: Option<AvatarPath>,
}

impl User {
    /// Build a user with no bio and no avatar.
    pub fn new(id: UserId, username: Username) -> Self {
        Self {
            id,
            username,
            bio: None,
            avatar: None,
        }
    }

    /// Replace the username.
    #[must_use]
    pub fn with_username(mut self, username: Username) -> Self {
        self.username = username;
        self
    }

    /// Replace the bio.
    #[must_use]
    pub fn with_bio(mut self, bio: Option<Bio>) -> Self {
        self.bio = bio;
        self
    }

    /// Replace the avatar path.
    #[must_use]
    pub fn with_avatar(mut self, avatar: Option<AvatarPath>) -> Self {
        self.avatar = avatar;
        self
    }

    /// Stable identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Current username.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Current bio, if set.
    pub fn bio(&self) -> Option<&Bio> {
        self.bio.as_ref()
    }

    /// Current avatar path, if set.
    pub fn avatar(&self) -> Option<&AvatarPath> {
        self.avatar.as_ref()
    }

    /// Reduce the user to the fields exposed by search.
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            username: self.username.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

/// Search result projection of a [`User`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    /// Identifier of the matched user.
    pub id: UserId,
    /// Matched username.
    pub username: Username,
    /// Server-relative avatar path, when one is set.
    pub avatar: Option<AvatarPath>,
}

#[cfg(test)]
mod tests;
