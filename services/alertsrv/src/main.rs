//! Visa Alert Service (AlertSrv)
//!
//! REST service managing visa appointment alerts.

use std::path::PathBuf;

use alertsrv::{
    api,
    config::{self, AlertConfig},
    store, AppState,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use common::logging::{self, LogConfig};
use tracing::info;

#[derive(Parser)]
#[command(name = "alertsrv")]
#[command(about = "Visa Alert Service", long_about = None)]
#[command(version)]
struct Args {
    /// Configuration file (YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service (default)
    Serve,
    /// Validate configuration and open the store, then exit
    Check,
    /// Print the default configuration as YAML
    DefaultConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let env_file = config::load_env_file(None)?;

    match args.command.unwrap_or(Commands::Serve) {
        Commands::DefaultConfig => {
            print!("{}", AlertConfig::default_yaml());
            Ok(())
        },
        Commands::Check => {
            let config = AlertConfig::load(args.config.as_deref())?;
            let store = store::open_store(&config.storage.url).await?;
            println!(
                "Configuration OK: listen {} / storage {} ({})",
                config.api.bind_address(),
                config.storage.url,
                store.backend()
            );
            Ok(())
        },
        Commands::Serve => serve(AlertConfig::load(args.config.as_deref())?, env_file).await,
    }
}

async fn serve(config: AlertConfig, env_file: Option<PathBuf>) -> Result<()> {
    let log_config = LogConfig::new("alertsrv")
        .with_level(config.logging.level.clone())
        .with_json(config.logging.json)
        .with_log_dir(config.logging.dir.clone());
    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = logging::init(&log_config)
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;

    info!("Starting Visa Alert Service...");
    if let Some(path) = &env_file {
        info!("Environment loaded from {}", path.display());
    }

    let store = store::open_store(&config.storage.url)
        .await
        .with_context(|| format!("failed to open store '{}'", config.storage.url))?;
    info!("Alert store opened ({})", store.backend());

    let addr = config.api.bind_address();
    let state = AppState::new(store, config);
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("Visa Alert Service started on {}", addr);
    info!("API endpoints:");
    info!("  GET /health - Health check");
    info!("  GET/POST /api/alerts - List and create alerts");
    info!("  GET/PUT/DELETE /api/alerts/{{id}} - Single alert");
    info!("  GET /api-docs/openapi.json - OpenAPI document");

    axum::serve(listener, app)
        .with_graceful_shutdown(common::shutdown::wait_for_shutdown())
        .await?;

    info!("Visa Alert Service stopped");
    Ok(())
}
