//! Service entry-point: loads settings, selects storage and serves the users
//! API.

mod server;

use color_eyre::eyre::{Result, WrapErr};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use rest_api_service::config::ServerSettings;

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

    let settings = ServerSettings::load_from_iter(std::env::args_os())
        .wrap_err("failed to load server settings")?;
    let users_state = server::build_users_state(&settings).await?;
    let (host, port) = settings.bind_addr();
    info!(%host, port, "starting server");

    server::create_server(&settings, users_state)
        .wrap_err_with(|| format!("failed to bind {host}:{port}"))?
        .await
        .wrap_err("server terminated")
}
