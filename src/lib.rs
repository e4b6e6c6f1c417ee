//! # mcp-settings
//!
//! A local web service for viewing and editing MCP (Model Context Protocol)
//! server configuration files used by several developer tools: project
//! `.mcp.json` files, editor configs (`.cursor/mcp.json`,
//! `.vscode/mcp.json`, VS Code user settings), the user-global
//! `~/.claude.json`, and the legacy Claude Desktop config.
//!
//! ## Modules
//! - `paths`: scope definitions and candidate location resolution
//! - `files`: guarded JSON file I/O with backup copies
//! - `validator`: structural validation of config documents
//! - `manager`: orchestration of resolution, storage and validation
//! - `presets`: static catalog of known server templates
//! - `api`: HTTP endpoints exposing the above

pub mod api;
pub mod config;
pub mod error;
pub mod files;
pub mod manager;
pub mod paths;
pub mod presets;
pub mod types;
pub mod validator;

pub use config::Config;
pub use error::{ConfigError, ConfigResult};
pub use manager::{ConfigInfo, ConfigManager};
pub use paths::{ConfigLocation, ConfigScope, PathResolver};
pub use types::{McpConfig, McpServer};
