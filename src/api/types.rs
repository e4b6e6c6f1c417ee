//! Shared wire types for the HTTP API.

use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

/// Generic response envelope, used for write acknowledgements and errors.
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn failure_with_data(message: impl Into<String>, data: Value) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Legacy path endpoint payload.
#[derive(Debug, Serialize)]
pub struct ConfigPathResponse {
    pub path: PathBuf,
    pub exists: bool,
}
