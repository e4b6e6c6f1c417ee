//! Static catalog of well-known MCP server templates.
//!
//! The catalog is embedded at compile time and parsed once on first use.
//! It is consumed by the UI to prefill new server entries; the config core
//! never reads it. A catalog that fails to parse behaves as empty.

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::types::McpServer;

static CATALOG_DATA: &str = include_str!("../presets/mcp_servers.json");

/// One preset server template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preset {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub config: McpServer,
}

#[derive(Debug, Deserialize)]
struct PresetFile {
    presets: Vec<Preset>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PresetCatalog;

impl PresetCatalog {
    pub fn new() -> Self {
        Self
    }

    pub fn all(&self) -> &'static [Preset] {
        static PRESETS: OnceLock<Vec<Preset>> = OnceLock::new();
        PRESETS.get_or_init(|| match serde_json::from_str::<PresetFile>(CATALOG_DATA) {
            Ok(file) => file.presets,
            Err(e) => {
                tracing::error!("Failed to parse embedded preset catalog: {e}");
                Vec::new()
            }
        })
    }

    pub fn by_id(&self, id: &str) -> Option<&'static Preset> {
        self.all().iter().find(|preset| preset.id == id)
    }

    /// Case-insensitive substring search over name, description and
    /// category.
    pub fn search(&self, query: &str) -> Vec<&'static Preset> {
        let query = query.to_lowercase();
        self.all()
            .iter()
            .filter(|preset| {
                preset.name.to_lowercase().contains(&query)
                    || preset.description.to_lowercase().contains(&query)
                    || preset.category.to_lowercase().contains(&query)
            })
            .collect()
    }

    pub fn by_category(&self, category: &str) -> Vec<&'static Preset> {
        self.all()
            .iter()
            .filter(|preset| preset.category.eq_ignore_ascii_case(category))
            .collect()
    }
}
