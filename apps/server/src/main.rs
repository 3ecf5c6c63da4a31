//! # Medora Server
//!
//! ## Usage
//! ```bash
//! medora-server                       # config from the platform config dir
//! medora-server --config ./medora.toml
//! RUST_LOG=medora_db=debug medora-server
//! ```

use std::path::PathBuf;

use anyhow::Context;
use medora_db::Database;
use medora_server::{build_router, AppState, ServerConfig};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("Starting Medora server...");

    let config = ServerConfig::load(config_path_arg()).context("Failed to load configuration")?;
    info!(
        addr = %config.bind_addr(),
        db_path = %config.database.path.display(),
        store = %config.store.name,
        utc_offset_minutes = config.store.utc_offset_minutes,
        "Configuration loaded"
    );

    let db = Database::new(config.db_config()?)
        .await
        .context("Failed to open database")?;
    info!("Database ready");

    let addr = config.bind_addr();
    let app = build_router(AppState::new(db.clone(), config));

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// `--config <path>` / `-c <path>`.
fn config_path_arg() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" || arg == "-c" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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

    info!("Shutdown signal received, starting graceful shutdown...");
}
