mod config;
mod db;
mod error;
mod folder_tree;
mod model;
mod routes;
mod server;
mod state;

use clap::Parser;
use std::sync::Arc;
use tracing::info;

use config::{CliArgs, ServerConfig};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let config = ServerConfig::from_args(args);

    // Keep the appender guard alive for the process lifetime so buffered
    // log lines flush on shutdown.
    let _log_guard = init_tracing(&config);

    info!("Starting casetrack-server v{}", env!("CARGO_PKG_VERSION"));
    info!("Database: {:?}", config.db_path);
    info!("Screenshots dir: {:?}", config.screenshots_dir);

    std::fs::create_dir_all(&config.screenshots_dir)?;

    let port = config.port;
    let state = Arc::new(AppState::new(config)?);

    let router = server::build_router(state.clone());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("Casetrack listening on http://0.0.0.0:{}", port);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Casetrack shutting down");
    Ok(())
}

fn init_tracing(config: &ServerConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "casetrack_server=info,tower_http=info".into());

    match &config.log_file {
        Some(path) => {
            let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
            let file = path.file_name().map(std::path::PathBuf::from).unwrap_or_else(|| "casetrack.log".into());
            let appender = tracing_appender::rolling::never(dir, file);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(env_filter).init();
            None
        }
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Received shutdown signal");
}
