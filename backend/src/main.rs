//! Backend entry-point: loads settings, prepares storage and serves the API.

mod server;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use recipe_backend::inbound::http::health::HealthState;
use recipe_backend::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use recipe_backend::settings::AppSettings;
use server::{ServerConfig, build_server_services, create_server, ensure_superuser};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings =
        AppSettings::load().map_err(|err| eyre!("failed to load settings: {err}"))?;
    let bind_addr = settings.bind_addr().wrap_err("invalid bind address")?;
    let hashing = settings
        .password_hashing()
        .wrap_err("invalid argon2 parameters")?;
    let mut config = ServerConfig::new(bind_addr, settings.password_policy(), hashing);

    match settings.database_url() {
        Some(url) => {
            run_migrations(url).await.wrap_err("migrations failed")?;
            let pool = DbPool::new(
                PoolConfig::new(url).with_max_size(settings.db_max_connections()),
            )
            .await
            .wrap_err("failed to build database pool")?;
            config = config.with_db_pool(pool);
        }
        None => warn!("no database configured; using in-memory storage"),
    }

    let services = build_server_services(&config);
    if let Some(seed) = settings.superuser() {
        ensure_superuser(&services.manager, &seed).await?;
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), services.state, &config)
        .wrap_err_with(|| format!("failed to bind {bind_addr}"))?;
    info!(%bind_addr, "listening");
    let outcome = server.await;
    health_state.mark_unhealthy();
    outcome.wrap_err("server terminated")
}
