//! Preset catalog endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::presets::Preset;

use super::routes::AppState;
use super::types::ApiResponse;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_presets))
        .route("/:id", get(get_preset))
        .route("/search/:query", get(search_presets))
}

#[derive(Debug, Serialize)]
struct PresetListResponse {
    presets: Vec<&'static Preset>,
}

/// GET /api/presets
async fn list_presets(State(state): State<Arc<AppState>>) -> Json<PresetListResponse> {
    Json(PresetListResponse {
        presets: state.presets.all().iter().collect(),
    })
}

/// GET /api/presets/:id
async fn get_preset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<&'static Preset>, (StatusCode, Json<ApiResponse>)> {
    state.presets.by_id(&id).map(Json).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::failure(format!(
                "Preset with id \"{id}\" not found"
            ))),
        )
    })
}

/// GET /api/presets/search/:query
async fn search_presets(
    State(state): State<Arc<AppState>>,
    Path(query): Path<String>,
) -> Json<PresetListResponse> {
    Json(PresetListResponse {
        presets: state.presets.search(&query),
    })
}
