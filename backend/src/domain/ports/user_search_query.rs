//! Driving port for username prefix search.

use async_trait::async_trait;

use crate::domain::{Error, UserSummary, UsernamePrefix};

/// Public user lookup; requires no authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserSearchQuery: Send + Sync {
    /// Users whose username starts with `prefix`, ignoring case.
    async fn search(&self, prefix: &UsernamePrefix) -> Result<Vec<UserSummary>, Error>;
}
