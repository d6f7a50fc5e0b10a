// API server binary entry point
//
// Purpose: load the crop model artifacts, then serve the recommendation form
// Usage: cargo run --bin api_server

use anyhow::Context;
use crop_recommender::{create_router, AppState, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Configuration from environment variables (needed first for the log level)
    let config = ServerConfig::from_env().context("Invalid server configuration")?;

    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.default_log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting crop recommendation server...");
    tracing::info!("Configuration:");
    tracing::info!("  ARTIFACT_DIR: {:?}", config.artifact_dir);
    tracing::info!("  STATIC_DIR: {:?}", config.static_dir);
    tracing::info!("  DEBUG: {}", config.debug);

    // Artifacts must load before anything binds a port
    let state = match AppState::new(&config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Error loading models: {:#}", e);
            return Err(e.context("Startup aborted: model artifacts unavailable"));
        }
    };
    tracing::info!("Application state initialized successfully");

    let app = create_router(state);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
