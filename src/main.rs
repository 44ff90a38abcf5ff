//! Markdown rendering proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌──────────────────────────────────────────────────────┐
//!                  │                   MARKDOWN PROXY                     │
//!   Client Request │  ┌─────────┐   ┌───────────┐   ┌───────────────┐     │
//!  ────────────────┼─▶│  trace  │──▶│ request id│──▶│   markdown    │──┐  │
//!                  │  │ timeout │   │           │   │ layer (match) │  │  │
//!                  │  └─────────┘   └───────────┘   └───────────────┘  │  │
//!                  │                                                   ▼  │
//!  Client Response │  ┌──────────────────────────┐   ┌───────────────┐    │
//!  ◀───────────────┼──│ render → template →      │◀──│ proxy handler │◀───┼── Upstream
//!                  │  │ header rewrite           │   │ (hyper client)│    │
//!                  │  └──────────────────────────┘   └───────────────┘    │
//!                  └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use markdown_proxy::config::validation::validate_config;
use markdown_proxy::config::{load_config, load_directives, ConfigError, ProxyConfig};
use markdown_proxy::markdown::HandlerConfig;
use markdown_proxy::observability::{logging, metrics};
use markdown_proxy::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "markdown-proxy")]
#[command(about = "Reverse proxy that renders upstream markdown responses as HTML", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directive file with `markdown { ... }` blocks.
    #[arg(short, long)]
    directives: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(long)]
    bind: Option<String>,

    /// Override `upstream.address`.
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
    if let Some(path) = &cli.directives {
        load_directives(&mut config, path)?;
    }
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if let Some(upstream) = cli.upstream {
        config.upstream.address = upstream;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init_tracing(&config.observability.log_level);
    tracing::info!("markdown-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    if config.markdown.is_empty() {
        tracing::info!("No markdown blocks configured, rendering text/markdown responses with defaults");
        config.markdown.push(HandlerConfig::fallback());
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.address,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        shutdown.trigger_on_ctrl_c().await;
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
