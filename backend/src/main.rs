//! Backend entry-point: loads configuration, prepares storage and serves the
//! REST API.

mod server;

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use animelist::inbound::http::health::HealthState;
use animelist::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use animelist::outbound::token::JwtTokenService;
use animelist::settings::AppSettings;

use server::{ServerConfig, create_server};

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
        AppSettings::load().map_err(|err| eyre!("failed to load configuration: {err}"))?;
    let secret = settings.jwt_secret()?;
    let tokens = Arc::new(JwtTokenService::new(
        &secret,
        settings.token_ttl()?,
        Arc::new(DefaultClock),
    ));

    let mut config = ServerConfig::new(settings.bind_addr(), tokens);
    if let Some(pool_config) = PoolConfig::from_settings(&settings)? {
        run_migrations(pool_config.database_url())
            .await
            .wrap_err("failed to apply database migrations")?;
        let pool = DbPool::connect(&pool_config)
            .await
            .wrap_err("failed to build database pool")?;
        config = config.with_db_pool(pool);
    }

    let bind_addr = config.bind_addr();
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)
        .wrap_err_with(|| format!("failed to bind {bind_addr}"))?;
    info!(%bind_addr, "listening");
    server.await.wrap_err("server terminated abnormally")
}
