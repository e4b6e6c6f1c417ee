//! HTTP API layer.
//!
//! Thin plumbing over the configuration core: route handlers parse
//! selectors, delegate to [`crate::manager::ConfigManager`] and the preset
//! catalog, and translate core errors into HTTP responses.

pub mod config;
pub mod presets;
pub mod routes;
pub mod types;

pub use routes::{serve, AppState};
