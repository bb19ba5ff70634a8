//! # promo-sweeper
//!
//! Background process that keeps campaign status in line with the clock and
//! with spend.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Sweeper Process                                  │
//! │                                                                         │
//! │  load SweeperConfig ──► open Database (migrations) ──► PromoEngine      │
//! │                                                            │            │
//! │              PROMO_SWEEP_ONCE=true ◄───────────────────────┤            │
//! │              run_once(now), exit                           │            │
//! │                                                            ▼            │
//! │                                   spawn Sweeper::run ◄── interval       │
//! │                                          │                              │
//! │                     SIGTERM / Ctrl+C ──► handle.shutdown(), join        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;

use anyhow::Context;
use chrono::Utc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use promo_db::{Database, DbConfig};
use promo_engine::{EngineConfig, PromoEngine};

use crate::config::SweeperConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,promo=debug,sqlx=warn")),
        )
        .with_target(true)
        .init();

    info!("Starting promo sweeper...");

    // Load configuration
    let config = SweeperConfig::load().context("Failed to load sweeper configuration")?;
    info!(
        db_path = %config.db_path.display(),
        interval_secs = config.sweep_interval.as_secs(),
        run_once = config.run_once,
        "Configuration loaded"
    );

    // Open database (runs embedded migrations)
    let db_config = DbConfig::new(config.db_path.clone())
        .max_connections(config.max_connections);
    let db = Database::new(db_config)
        .await
        .context("Failed to open database")?;

    let engine = PromoEngine::new(
        db.clone(),
        EngineConfig::default().sweep_interval(config.sweep_interval),
    );
    let (sweeper, handle) = engine.sweeper();

    if config.run_once {
        let report = sweeper.run_once(Utc::now()).await?;
        info!(
            completed = report.completed,
            activated = report.activated,
            budget_completed = report.budget_completed,
            "Single sweep complete"
        );
        db.close().await;
        return Ok(());
    }

    let task = tokio::spawn(sweeper.run());

    shutdown_signal().await?;
    handle.shutdown().await;
    task.await.context("Sweeper task panicked")?;

    db.close().await;
    info!("Sweeper shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() -> anyhow::Result<()> {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .context("Failed to install Ctrl+C handler")
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .context("Failed to install signal handler")?
            .recv()
            .await;
        Ok::<(), anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<anyhow::Result<()>>();

    tokio::select! {
        result = ctrl_c => result?,
        result = terminate => result?,
    }

    info!("Shutdown signal received, starting graceful shutdown...");
    Ok(())
}
