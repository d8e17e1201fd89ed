mod handlers;
mod metrics;
mod routes;

use anyhow::{Context, Result};
use arena_common::catalog::JsonCatalog;
use arena_common::config::Config;
use arena_engine::config::LanguageConfigManager;
use arena_engine::{AdapterRegistry, Judge, JudgeLimits, WorkspaceManager};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

pub struct AppState {
    pub judge: Arc<Judge>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("Arena judge API booting...");

    let config = Config::from_env().context("Invalid environment configuration")?;

    let catalog = JsonCatalog::load(&config.challenges_path).with_context(|| {
        format!(
            "Failed to load challenge catalog from {}",
            config.challenges_path.display()
        )
    })?;
    info!(challenges = catalog.len(), path = %config.challenges_path.display(), "Challenge catalog loaded");

    let languages = LanguageConfigManager::load_or_builtin(&config.languages_path)?;
    let adapters = AdapterRegistry::from_config(&languages);

    tokio::fs::create_dir_all(&config.workspace_root)
        .await
        .with_context(|| {
            format!(
                "Failed to create workspace root {}",
                config.workspace_root.display()
            )
        })?;
    info!(root = %config.workspace_root.display(), "Workspace root ready");

    let judge = Judge::new(
        Arc::new(catalog),
        adapters,
        WorkspaceManager::new(&config.workspace_root),
        JudgeLimits::from_config(&config),
    );
    let state = Arc::new(AppState {
        judge: Arc::new(judge),
    });

    let app = routes::app(state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!("HTTP server listening on {}", config.bind_addr);
    info!("Ready to judge submissions");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received - draining in-flight submissions"),
        Err(e) => {
            warn!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
