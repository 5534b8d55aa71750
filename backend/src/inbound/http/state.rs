//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see driving ports, so
//! tests can swap in mocks without touching I/O.

use std::sync::Arc;

use crate::domain::{AvatarPolicy, PublicUrl};
use crate::domain::ports::{ProfileCommand, UserSearchQuery};

/// Dependency bundle for profile and search handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Profile mutations for the signed-in user.
    pub profile: Arc<dyn ProfileCommand>,
    /// Public username search.
    pub search: Arc<dyn UserSearchQuery>,
    /// Base for absolute `avatarUrl` values.
    pub public_url: PublicUrl,
    /// Type and size rules checked while an upload is streamed in.
    pub avatar_policy: AvatarPolicy,
}

impl HttpState {
    /// Bundle the ports with the URL builder used for `avatarUrl`.
    pub fn new(
        profile: Arc<dyn ProfileCommand>,
        search: Arc<dyn UserSearchQuery>,
        public_url: PublicUrl,
    ) -> Self {
        Self {
            profile,
            search,
            public_url,
            avatar_policy: AvatarPolicy::default(),
        }
    }

    /// Limits applied while reading avatar uploads off the wire.
    #[must_use]
    pub fn with_avatar_policy(mut self, policy: AvatarPolicy) -> Self {
        self.avatar_policy = policy;
        self
    }
}
