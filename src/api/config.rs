//! Configuration management endpoints.
//!
//! Thin translation layer over [`ConfigManager`]: parses the optional scope
//! selector, forwards the operation, and maps the core error taxonomy onto
//! HTTP statuses. Validation failures return the full error list; I/O and
//! resolution failures are server errors.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ConfigError;
use crate::manager::ConfigInfo;
use crate::paths::ConfigScope;
use crate::types::McpConfig;

use super::routes::AppState;
use super::types::{ApiResponse, ConfigPathResponse};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(load_config).post(save_config))
        .route("/full", get(load_full_config))
        .route("/info", get(config_info))
        // Legacy endpoint kept for older clients.
        .route("/path", get(config_path))
}

type ApiError = (StatusCode, Json<ApiResponse>);

#[derive(Debug, Deserialize)]
struct ScopeQuery {
    scope: Option<String>,
}

fn parse_scope(query: &ScopeQuery) -> Result<Option<ConfigScope>, ApiError> {
    match query.scope.as_deref() {
        None => Ok(None),
        Some(raw) => ConfigScope::parse(raw).map(Some).ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::failure("Invalid scope parameter")),
            )
        }),
    }
}

fn error_response(context: &str, err: ConfigError) -> ApiError {
    match err {
        ConfigError::Validation { errors } => {
            tracing::warn!("{context}: rejected invalid configuration");
            (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::failure_with_data(
                    "Invalid configuration",
                    json!({ "errors": errors }),
                )),
            )
        }
        other => {
            tracing::error!("{context}: {other}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::failure(format!("{context}: {other}"))),
            )
        }
    }
}

/// GET /api/config
async fn load_config(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<McpConfig>, ApiError> {
    let scope = parse_scope(&query)?;
    state
        .manager
        .load(scope)
        .await
        .map(Json)
        .map_err(|e| error_response("Failed to load config", e))
}

/// GET /api/config/full
async fn load_full_config(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<Value>, ApiError> {
    let scope = parse_scope(&query)?;
    state
        .manager
        .load_full(scope)
        .await
        .map(Json)
        .map_err(|e| error_response("Failed to load full config", e))
}

/// POST /api/config
async fn save_config(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ScopeQuery>,
    Json(document): Json<Value>,
) -> Result<Json<ApiResponse>, ApiError> {
    let scope = parse_scope(&query)?;
    state
        .manager
        .save(&document, scope)
        .await
        .map_err(|e| error_response("Failed to save config", e))?;
    Ok(Json(ApiResponse::ok("Configuration saved successfully")))
}

/// GET /api/config/info
async fn config_info(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<ConfigInfo>, ApiError> {
    let scope = parse_scope(&query)?;
    state
        .manager
        .info(scope)
        .await
        .map(Json)
        .map_err(|e| error_response("Failed to get config info", e))
}

/// GET /api/config/path
async fn config_path(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<ConfigPathResponse>, ApiError> {
    let scope = parse_scope(&query)?;
    let path = state
        .manager
        .config_path(scope)
        .await
        .map_err(|e| error_response("Failed to get config path", e))?;
    let exists = state
        .manager
        .exists(scope)
        .await
        .map_err(|e| error_response("Failed to get config path", e))?;
    Ok(Json(ConfigPathResponse { path, exists }))
}
