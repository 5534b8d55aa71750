//! Server settings loaded via OrthoConfig and the resolved server configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use ortho_config::OrthoConfig;
use serde::Deserialize;

use profile_service::domain::{
    AvatarPolicy, DEFAULT_AVATAR_URL_PREFIX, DEFAULT_MAX_AVATAR_BYTES, DEFAULT_PUBLIC_HOST,
    DEFAULT_PUBLIC_PORT, PublicUrl,
};
use profile_service::outbound::persistence::DbPool;

const DEFAULT_BIND_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// Values read from `SERVER_*` environment variables, configuration files
/// and command-line flags.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SERVER")]
pub struct ServerSettings {
    /// Public host used when building absolute URLs.
    pub host: Option<String>,
    /// Public port; also the listening port.
    pub port: Option<u16>,
    /// Interface to bind.
    pub bind_host: Option<IpAddr>,
    /// PostgreSQL URL. Without one, users live in memory.
    pub database_url: Option<String>,
    /// Apply embedded migrations before serving.
    #[ortho_config(default = false)]
    pub run_migrations: bool,
    /// Directory avatar files are written to.
    pub avatar_dir: Option<PathBuf>,
    /// Largest accepted avatar in bytes.
    pub max_avatar_size: Option<usize>,
    /// Delete the previous avatar file after a successful replacement.
    #[ortho_config(default = false)]
    pub prune_replaced_avatars: bool,
}

impl ServerSettings {
    /// Public host/port pair for `avatarUrl`.
    pub fn public_url(&self) -> PublicUrl {
        PublicUrl::new(
            self.host.as_deref().unwrap_or(DEFAULT_PUBLIC_HOST),
            self.port(),
        )
    }

    /// Port to listen on.
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PUBLIC_PORT)
    }

    /// Address to listen on.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_host.unwrap_or(DEFAULT_BIND_HOST), self.port())
    }

    /// Avatar directory, defaulting to `static/avatars` under the working directory.
    pub fn avatar_dir(&self) -> PathBuf {
        self.avatar_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_AVATAR_URL_PREFIX))
    }

    /// Upload rules derived from the size and pruning settings.
    pub fn avatar_policy(&self) -> AvatarPolicy {
        AvatarPolicy::new(
            self.max_avatar_size.unwrap_or(DEFAULT_MAX_AVATAR_BYTES),
            DEFAULT_AVATAR_URL_PREFIX,
        )
        .with_prune_replaced(self.prune_replaced_avatars)
    }
}

/// Fully resolved inputs for [`super::create_server`].
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) public_url: PublicUrl,
    pub(crate) avatar_dir: PathBuf,
    pub(crate) avatar_policy: AvatarPolicy,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Combine session settings with the loaded server settings.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, settings: &ServerSettings) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr: settings.bind_addr(),
            public_url: settings.public_url(),
            avatar_dir: settings.avatar_dir(),
            avatar_policy: settings.avatar_policy(),
            db_pool: None,
        }
    }

    /// Back the user repository with PostgreSQL.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}
