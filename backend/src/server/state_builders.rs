//! Builders wiring adapters into the HTTP state.

use std::sync::Arc;

use tracing::{info, warn};

use profile_service::domain::ProfileService;
use profile_service::domain::ports::{ReadinessProbe, UserRepository};
use profile_service::inbound::http::state::HttpState;
use profile_service::outbound::persistence::DieselUserRepository;
use profile_service::outbound::{CapStdAvatarStore, InMemoryUserRepository};

use super::ServerConfig;

/// Build handler state, using PostgreSQL when a pool is configured and an
/// empty in-memory repository otherwise.
///
/// # Errors
///
/// Returns [`std::io::Error`] when the avatar directory cannot be opened.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    let avatars = CapStdAvatarStore::open(&config.avatar_dir)
        .map_err(|err| std::io::Error::other(err.to_string()))?;
    info!(dir = %avatars.root().display(), "avatar store ready");
    let avatars = Arc::new(avatars);

    match &config.db_pool {
        Some(pool) => Ok(state_for(
            Arc::new(DieselUserRepository::new(pool.clone())),
            avatars,
            config,
        )),
        None => {
            warn!("no database configured; users are kept in memory");
            Ok(state_for(
                Arc::new(InMemoryUserRepository::new()),
                avatars,
                config,
            ))
        }
    }
}

fn state_for<R>(users: Arc<R>, avatars: Arc<CapStdAvatarStore>, config: &ServerConfig) -> HttpState
where
    R: UserRepository + 'static,
{
    let service = Arc::new(ProfileService::new(
        users,
        avatars,
        config.avatar_policy.clone(),
    ));
    HttpState::new(service.clone(), service, config.public_url.clone())
        .with_avatar_policy(config.avatar_policy.clone())
}

/// Readiness dependency for the configured database, if any.
pub(super) fn readiness_probe(config: &ServerConfig) -> Option<Arc<dyn ReadinessProbe>> {
    config
        .db_pool
        .clone()
        .map(|pool| Arc::new(pool) as Arc<dyn ReadinessProbe>)
}
