//! Fake metrics server - main binary
//!
//! Registers a population of synthetic counters, gauges, and histograms,
//! updates them on a fixed interval, and serves them over HTTP for
//! Prometheus scrapes.
//!
//! Usage:
//!   fakemetrics [OPTIONS]
//!
//! Options:
//!   --config <PATH>     Configuration file (default: fakemetrics.yml)
//!   --host <HOST>       Bind address (overrides config)
//!   --port <PORT>       HTTP port (overrides config)
//!   --generate-config   Write the default config file and exit

mod config;
mod handlers;
mod router;

use crate::config::ServerConfig;
use crate::handlers::AppState;
use crate::router::create_router;
use clap::Parser;
use fakemetrics_generator::Generator;
use fakemetrics_registry::Registry;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "fakemetrics")]
#[command(about = "Generates fake Prometheus metrics and serves them over HTTP")]
#[command(version)]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = "fakemetrics.yml")]
    config: PathBuf,

    /// Bind address (overrides config)
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// HTTP port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Write the default configuration to the config path and exit
    #[arg(long)]
    generate_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Generate config and exit if requested
    if cli.generate_config {
        ServerConfig::write_default(&cli.config)?;
        println!("Generated default configuration: {}", cli.config.display());
        return Ok(());
    }

    // Load configuration
    let mut config = if cli.config.exists() {
        match ServerConfig::from_file(&cli.config) {
            Ok(config) => {
                println!("Loaded configuration from: {}", cli.config.display());
                config
            }
            Err(e) => {
                eprintln!("Warning: failed to load {}: {}", cli.config.display(), e);
                eprintln!("Using default configuration");
                ServerConfig::default()
            }
        }
    } else {
        ServerConfig::default()
    };

    // Apply command line overrides
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level())
        .with_target(config.logging.show_target)
        .with_thread_ids(config.logging.show_thread_ids)
        .with_file(config.logging.show_location)
        .with_line_number(config.logging.show_location)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting fakemetrics v{}", env!("CARGO_PKG_VERSION"));

    // Wire the generator to a fresh registry and start it
    let registry = Arc::new(Registry::new());
    let generator = Generator::new(config.to_generator_config(), Arc::clone(&registry));
    generator.start()?;

    let state = Arc::new(AppState {
        registry: Arc::clone(&registry),
    });
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Scrape endpoint: GET http://{}/metrics", addr);
    info!("Health check: GET http://{}/health", addr);

    // Run server until a shutdown signal arrives
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The generator joins its update task, so no writes happen after this
    generator.stop().await?;
    info!("Shutdown complete");

    Ok(())
}

/// Resolves when SIGINT or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("SIGINT received, shutting down gracefully...");
        }
        _ = terminate => {
            info!("SIGTERM received, shutting down gracefully...");
        }
    }
}
