//! Calc Server - HTTP calculator with a self-expiring result cache

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use calc_cache::calc::Calculation;
use calc_cache::{create_router, AppState, Config, ExpiringCache};

#[derive(Parser)]
#[command(name = "calc_server")]
#[command(about = "HTTP calculator that caches results with a sliding TTL")]
struct Cli {
    /// Port to listen on (overrides SERVER_PORT, default 8080)
    port: Option<u16>,
}

/// Main entry point for the calculator server.
///
/// # Startup Sequence
/// 1. Parse the command line
/// 2. Initialize tracing subscriber for logging
/// 3. Load configuration from environment variables
/// 4. Create the result cache
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "calc_cache=info,calc_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting calculator server");

    let config = Config::from_env().with_port(cli.port);
    info!(
        "Configuration loaded: port={}, cache_ttl={}s",
        config.server_port,
        config.cache_ttl.as_secs()
    );

    let state = AppState::from_config(&config);
    let cache = state.cache.clone();
    info!("Result cache initialized");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cache))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, cancels every pending eviction timer.
async fn shutdown_signal(cache: ExpiringCache<Calculation>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    let dropped = cache.clear();
    info!("Cancelled {} pending cache evictions", dropped);
}
