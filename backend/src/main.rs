//! Backend entry-point: loads settings, prepares the store and serves the
//! catalogue API.

mod server;

use std::ffi::OsString;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use course_catalogue::inbound::http::health::HealthState;
use course_catalogue::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use course_catalogue::settings::AppSettings;
use server::{ServerConfig, create_server};

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(format!("{context}: {err}"))
}

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

    let settings = AppSettings::load_from_iter(std::env::args_os().collect::<Vec<OsString>>())
        .map_err(|err| startup_error("failed to load settings", err))?;
    let bind_addr = settings
        .bind_addr()
        .map_err(|err| startup_error("invalid settings", err))?;
    let accounts = settings
        .accounts()
        .map_err(|err| startup_error("invalid settings", err))?;
    let rates = settings
        .throttle_rates()
        .map_err(|err| startup_error("invalid settings", err))?;

    let mut config =
        ServerConfig::new(bind_addr, accounts, rates).with_demo_seed(settings.seed_demo_data);
    match settings.database_url.as_deref() {
        Some(url) => {
            run_pending_migrations(url)
                .await
                .map_err(|err| startup_error("migrations failed", err))?;
            let pool = DbPool::new(
                PoolConfig::new(url).with_max_size(settings.db_max_connections()),
            )
            .await
            .map_err(|err| startup_error("database pool", err))?;
            config = config.with_db_pool(pool);
        }
        None => info!("no database configured; serving from memory"),
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config).await?;
    let result = server.await;
    health_state.mark_draining();
    result
}
