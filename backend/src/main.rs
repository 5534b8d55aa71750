//! Profile service entry-point: loads settings, prepares storage and serves
//! the REST API.

mod server;

use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use profile_service::inbound::http::session_config::{BuildMode, session_settings_from_env};
use profile_service::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use server::{ServerConfig, ServerSettings, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load()
        .map_err(|e| std::io::Error::other(format!("invalid server settings: {e}")))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;

    let mut config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        &settings,
    );
    if let Some(url) = settings.database_url.as_deref() {
        if settings.run_migrations {
            let applied = run_pending_migrations(url)
                .await
                .map_err(std::io::Error::other)?;
            info!(applied, "database migrations complete");
        }
        let pool = DbPool::new(PoolConfig::new(url))
            .await
            .map_err(std::io::Error::other)?;
        config = config.with_db_pool(pool);
    }

    let bind_addr = settings.bind_addr();
    let public_url = settings.public_url();
    let server = create_server(config)?;
    info!(%bind_addr, %public_url, "profile service listening");
    server.await
}
