//! Application builder: wires router, middleware and state into an Axum app
//! and runs it next to the background workers.

use std::sync::Arc;

use axum::Router;
use sqlx::PgPool;
use tokio::sync::watch;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use ecodeli_core::config::AppConfig;
use ecodeli_core::config::app::CorsConfig;
use ecodeli_core::error::AppError;
use ecodeli_worker::{CronScheduler, NotificationWorker};

use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState, cors_config: &CorsConfig) -> Router {
    build_router(state)
        .layer(CompressionLayer::new())
        .layer(build_cors_layer(cors_config))
        .layer(TraceLayer::new_for_http())
}

/// Runs the EcoDeli server with the given configuration and database pool.
pub async fn run_server(config: AppConfig, db_pool: PgPool) -> Result<(), AppError> {
    tracing::info!("Starting EcoDeli server...");

    let config = Arc::new(config);
    let state = AppState::new(Arc::clone(&config), db_pool)?;

    // ── Shutdown channel & workers ───────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let worker_handle = if config.worker.enabled {
        let runner = Arc::new(state.notification_runner.fork("worker"));
        let worker = NotificationWorker::new(runner, config.worker.clone());
        let cancel = shutdown_rx.clone();
        Some(tokio::spawn(async move {
            worker.run(cancel).await;
        }))
    } else {
        tracing::info!("Background worker disabled");
        None
    };

    let mut scheduler = if config.worker.enabled {
        let scheduler = CronScheduler::new(Arc::clone(&state.announcement_service)).await?;
        scheduler.register_default_tasks(&config.worker).await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        None
    };

    // ── HTTP server ──────────────────────────────────────────────
    let app = build_app(state, &config.server.cors);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("EcoDeli server listening on {}", addr);

    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    if let Some(scheduler) = scheduler.as_mut() {
        scheduler.shutdown().await?;
    }
    if let Some(handle) = worker_handle {
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "Notification worker task panicked");
        }
    }

    tracing::info!("EcoDeli server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
    }
}
