//! Stockbook Server — Application entry point.

use stockbook_db::{run_migrations, DbConfig, DbManager};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("stockbook=info".parse().unwrap()),
        )
        .json()
        .init();

    tracing::info!("Starting stockbook server...");

    let config = DbConfig::from_env();
    let manager = match DbManager::connect(&config).await {
        Ok(m) => m,
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_migrations(manager.client()).await {
        tracing::error!(error = %e, "Failed to apply migrations");
        std::process::exit(1);
    }

    if let Err(e) = manager.health_check().await {
        tracing::error!(error = %e, "Database health check failed");
        std::process::exit(1);
    }

    tracing::info!("Stockbook server ready.");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }

    tracing::info!("Shutting down...");
    manager.close().await;

    tracing::info!("Stockbook server stopped.");
}
