//! Backend entry-point: loads settings, wires the services and runs the
//! HTTP server.

use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use backend::server::{AppSettings, create_server};
use ortho_config::OrthoConfig;

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

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    create_server(&settings)?.await
}
