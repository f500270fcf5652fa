//! pollcast server binary
//!
//! ```text
//! pollcast --port 8080 --jsonpath db.json
//! ```
//!
//! The snapshot file must exist and hold a JSON topic list (`[]` for a
//! fresh install). Logging is controlled through `RUST_LOG`.

use std::path::PathBuf;

use clap::Parser;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use pollcast::server::config::{DEFAULT_PORT, DEFAULT_SNAPSHOT_PATH};
use pollcast::{PollServer, ServerConfig};

#[derive(Debug, Parser)]
#[command(version, about = "Live polling server")]
struct Args {
    /// Server port number
    #[arg(long, env = "POLLCAST_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Snapshot JSON file path
    #[arg(long, env = "POLLCAST_JSONPATH", default_value = DEFAULT_SNAPSHOT_PATH)]
    jsonpath: PathBuf,

    /// Origin allowed to call the API (repeatable)
    #[arg(long = "allow-origin", env = "POLLCAST_ALLOW_ORIGIN", value_delimiter = ',')]
    allow_origins: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = ServerConfig::default()
        .port(args.port)
        .snapshot_path(args.jsonpath);
    if !args.allow_origins.is_empty() {
        config = config.allowed_origins(args.allow_origins);
    }

    tracing::debug!(origins = ?config.allowed_origins, "CORS configured");

    let server = PollServer::load(config).await?;
    let stats = server.run_until(shutdown_signal()).await?;

    tracing::info!(saves = stats.saves, failures = stats.failures, "Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
