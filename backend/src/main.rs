//! Backend entry-point: loads settings, prepares storage and serves the API.

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{error, warn};
use tracing_subscriber::{EnvFilter, fmt};

use vetpal::inbound::http::health::HealthState;
use vetpal::server::{BuildMode, ServerSettings, create_server, prepare_config};

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

    let settings = ServerSettings::load_from_iter(std::env::args_os())
        .map_err(|e| {
            error!(error = %e, "failed to load settings");
            std::io::Error::other(e.to_string())
        })?;
    let config = prepare_config(&settings, BuildMode::from_debug_assertions())
        .await
        .map_err(|e| {
            error!(error = %e, "startup failed");
            std::io::Error::other(e.to_string())
        })?;

    let health_state = web::Data::new(HealthState::new());
    create_server(health_state, config)?.await
}
