use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::infrastructure::bootstrap;
use crate::infrastructure::config::AppConfig;
use crate::interfaces::http::start_server;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

pub async fn run() -> std::io::Result<()> {
    // `.env` may carry RUST_LOG, so it is read before the subscriber starts.
    let dotenv_error = AppConfig::read_dotenv();
    init_tracing();
    if let Some(err) = dotenv_error {
        warn!(error = %err, "Failed to read .env file");
    }

    let config = AppConfig::load().map_err(|err| {
        error!(error = %err, "Failed to load configuration");
        std::io::Error::other(err.to_string())
    })?;

    let services = bootstrap::setup(&config).map_err(|err| {
        error!(error = %err, "Startup failed");
        std::io::Error::other(err.to_string())
    })?;

    info!(host = %config.host, port = config.port, "Starting HTTP server");
    start_server(services, &config.host, config.port)?.await
}
