//! Portgate - path-addressed reverse proxy.
//!
//! Serves two route shapes:
//! - `/proxy/<port>/<rest>`: forwarded to `http://<target-host>:<port>/<rest>`
//!   with redirects rewritten back under the public base path
//! - `/absproxy/<port>/<rest>`: forwarded with the path unmodified

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use portgate::config::{loader, ProxyConfig};
use portgate::http::HttpServer;
use portgate::lifecycle::Shutdown;
use portgate::observability::metrics;

#[derive(Parser)]
#[command(name = "portgate", version, about = "Path-addressed HTTP reverse proxy")]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portgate=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => loader::load_config(path)?,
        None => ProxyConfig::default(),
    };
    if let Some(listen) = args.listen {
        config.listener.bind_address = listen;
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        target_host = %config.target.host,
        upstream_timeout_secs = ?config.timeouts.upstream_secs,
        "Configuration loaded"
    );

    // Bind TCP listener
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    // Initialize metrics exporter
    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    // Create and run HTTP server
    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();

    let server = HttpServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
