//! HTTP route assembly and server lifecycle.

use std::sync::Arc;

use axum::{extract::State, response::Json, routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::manager::ConfigManager;
use crate::presets::PresetCatalog;

use super::types::HealthResponse;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub manager: ConfigManager,
    pub presets: PresetCatalog,
}

/// Start the HTTP server and block until shutdown.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let manager = ConfigManager::new()?;
    let state = Arc::new(AppState {
        config: config.clone(),
        manager,
        presets: PresetCatalog::new(),
    });

    let app = Router::new()
        .route("/api/health", get(health))
        .nest("/api/config", super::config::routes())
        .nest("/api/presets", super::presets::routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::clone(&state));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("MCP settings service listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, stopping server");
}

/// Health check endpoint.
async fn health(State(_state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
