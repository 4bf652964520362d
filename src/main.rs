//! Caching forward proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────┐
//!                     │                CACHING PROXY                  │
//!   Client Request    │  ┌─────────┐   ┌──────────┐   ┌───────────┐  │
//!   ──────────────────┼─▶│  http   │──▶│  proxy   │──▶│   cache   │  │
//!                     │  │ server  │   │ handler  │◀──│  (TTL)    │  │
//!                     │  └─────────┘   └────┬─────┘   └───────────┘  │
//!                     │                     │ miss                    │
//!                     │                     ▼                         │
//!   Client Response   │               ┌───────────┐                   │
//!   ◀─────────────────┼───────────────│ forwarder │◀──────────────────┼──── Origin
//!                     │               └───────────┘                   │
//!                     └──────────────────────────────────────────────┘
//! ```
//!
//! `GET /proxy?url=<target>` names the origin explicitly; any other request is
//! forwarded to the target named by its own request line (or, for origin-form
//! requests, to `upstream.base_url`).

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use caching_proxy::config::{load_config, ProxyConfig};
use caching_proxy::lifecycle::{signals, Shutdown};
use caching_proxy::observability::{logging, metrics};
use caching_proxy::HttpServer;

#[derive(Parser)]
#[command(name = "caching-proxy")]
#[command(about = "Forwarding HTTP proxy with a TTL response cache", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override `cache.ttl_secs`.
    #[arg(long)]
    ttl_secs: Option<u64>,

    /// Override `upstream.base_url` (reverse-proxy mode).
    #[arg(long)]
    upstream: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if let Some(ttl_secs) = cli.ttl_secs {
        config.cache.ttl_secs = ttl_secs;
    }
    if let Some(upstream) = cli.upstream {
        config.upstream.base_url = Some(upstream);
    }

    logging::init(&config.observability.log_level)?;

    tracing::info!("caching-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        cache_enabled = config.cache.enabled,
        ttl_secs = config.cache.ttl_secs,
        upstream = ?config.upstream.base_url,
        request_timeout_secs = config.upstream.request_timeout_secs,
        "Configuration loaded"
    );

    // Validates the whole config before anything is bound.
    let server = HttpServer::new(config)?;

    let observability = &server.config().observability;
    if observability.metrics_enabled {
        metrics::init_metrics(observability.metrics_address.parse()?)?;
    }

    let listener = TcpListener::bind(&server.config().listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(signals::shutdown_on_signal(shutdown));

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
