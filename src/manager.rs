//! Configuration manager: ties resolution, storage and validation together.
//!
//! Operations resolve their target location fresh on every call, normalize
//! heterogeneous file shapes into the canonical document, gate saves behind
//! validation, and back the prior file up before any overwrite. A missing
//! config file is a normal state, not an error.

use chrono::Local;
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};
use crate::files::{self, FileStore};
use crate::paths::{self, ConfigLocation, ConfigScope, PathResolver};
use crate::types::{McpConfig, MCP_SERVERS_KEY};
use crate::validator;

/// Active location plus the full candidate list, for scope-switching UIs.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInfo {
    pub path: PathBuf,
    pub exists: bool,
    pub scope: ConfigScope,
    pub display_name: String,
    pub all_locations: Vec<ConfigLocation>,
}

/// Key shapes under which VS Code user settings have historically stored
/// the server mapping. Save writes back whichever shape is present so a
/// user's file format is never silently migrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SettingsShape {
    /// `"mcp.servers": { ... }` as a literal dotted key.
    Dotted,
    /// `"mcp": { "servers": { ... } }`.
    Nested,
    /// `"mcpServers": { ... }` at the top level.
    Flat,
}

pub struct ConfigManager {
    resolver: PathResolver,
    store: FileStore,
}

impl ConfigManager {
    pub fn new() -> ConfigResult<Self> {
        Ok(Self {
            resolver: PathResolver::new()?,
            store: FileStore::new()?,
        })
    }

    pub fn with_parts(resolver: PathResolver, store: FileStore) -> Self {
        Self { resolver, store }
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Load the canonical document for a scope. A missing file yields an
    /// empty server mapping; so does a file without an object-typed
    /// `mcpServers` field.
    pub async fn load(&self, scope: Option<ConfigScope>) -> ConfigResult<McpConfig> {
        if scope == Some(ConfigScope::VscodeUser) {
            return self.load_vscode_user().await;
        }

        let path = self.resolver.config_path(scope).await?;
        if !files::exists(&path).await {
            return Ok(McpConfig::default());
        }
        let value = self.store.read_json(&path).await?;
        Ok(McpConfig::from_file_value(&value))
    }

    /// Load the entire parsed file content, for scopes whose files carry
    /// fields beyond the server mapping.
    pub async fn load_full(&self, scope: Option<ConfigScope>) -> ConfigResult<Value> {
        if scope == Some(ConfigScope::VscodeUser) {
            let config = self.load_vscode_user().await?;
            return Ok(json!({ MCP_SERVERS_KEY: Value::Object(config.mcp_servers) }));
        }

        let path = self.resolver.config_path(scope).await?;
        if !files::exists(&path).await {
            return Ok(json!({ MCP_SERVERS_KEY: {} }));
        }
        self.store.read_json(&path).await
    }

    /// Validate and persist a document. The save is rejected wholesale when
    /// validation fails; an existing target is backed up first, and a
    /// backup failure aborts the save.
    pub async fn save(&self, document: &Value, scope: Option<ConfigScope>) -> ConfigResult<()> {
        let report = validator::validate_document(document);
        if !report.valid {
            return Err(ConfigError::Validation {
                errors: report.errors,
            });
        }

        // Validation guarantees an object-typed mapping.
        let servers = document
            .get(MCP_SERVERS_KEY)
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        if scope == Some(ConfigScope::VscodeUser) {
            return self.save_vscode_user(servers).await;
        }

        let location = self.resolver.resolve_active(scope).await?;
        let (path, target_scope) = match location {
            Some(location) => (location.path, location.scope),
            // Nothing exists anywhere: first save goes to the user config.
            None => (self.resolver.user_config_path(), ConfigScope::User),
        };

        let existed = files::exists(&path).await;
        if existed {
            self.create_backup(&path).await?;
        }

        let data = if target_scope == ConfigScope::User {
            // The user file is shared with other tools: start from what is
            // on disk, overlay the document, then the server mapping.
            let mut merged = if existed {
                self.store
                    .read_json(&path)
                    .await?
                    .as_object()
                    .cloned()
                    .unwrap_or_default()
            } else {
                Map::new()
            };
            if let Some(fields) = document.as_object() {
                for (key, value) in fields {
                    merged.insert(key.clone(), value.clone());
                }
            }
            merged.insert(MCP_SERVERS_KEY.to_string(), Value::Object(servers));
            Value::Object(merged)
        } else {
            json!({ MCP_SERVERS_KEY: Value::Object(servers) })
        };

        self.store.write_json(&path, &data).await?;
        tracing::info!(
            path = %path.display(),
            scope = target_scope.as_str(),
            "Saved MCP config"
        );
        Ok(())
    }

    /// On-demand backup of a config file. Defaults to the active config
    /// path; a missing target is an error.
    pub async fn backup(&self, path: Option<&Path>) -> ConfigResult<PathBuf> {
        let target = match path {
            Some(path) => path.to_path_buf(),
            None => self.resolver.config_path(None).await?,
        };
        if !files::exists(&target).await {
            return Err(ConfigError::Backup {
                path: target,
                message: "config file does not exist".to_string(),
            });
        }
        self.create_backup(&target).await
    }

    /// Active location plus all candidates. When no config exists anywhere,
    /// defaults to the user scope's canonical path so callers always have a
    /// location to display and offer to create.
    pub async fn info(&self, scope: Option<ConfigScope>) -> ConfigResult<ConfigInfo> {
        let active = self.resolver.resolve_active(scope).await?;
        let all_locations = self.resolver.resolve_candidates().await?;

        let location = match active {
            Some(location) => location,
            None => all_locations
                .iter()
                .find(|location| location.scope == ConfigScope::User)
                .cloned()
                .ok_or_else(|| {
                    ConfigError::Resolution("user scope candidate missing".to_string())
                })?,
        };

        Ok(ConfigInfo {
            path: location.path,
            exists: location.exists,
            scope: location.scope,
            display_name: location.display_name,
            all_locations,
        })
    }

    pub async fn config_path(&self, scope: Option<ConfigScope>) -> ConfigResult<PathBuf> {
        if scope == Some(ConfigScope::VscodeUser) {
            return self.resolver.vscode_user_settings_path();
        }
        self.resolver.config_path(scope).await
    }

    pub async fn exists(&self, scope: Option<ConfigScope>) -> ConfigResult<bool> {
        let path = self.config_path(scope).await?;
        Ok(files::exists(&path).await)
    }

    /// Copy `path` to a timestamped backup next to it. When the timestamped
    /// name is already taken (saves within the same second), a numeric
    /// suffix keeps every backup.
    async fn create_backup(&self, path: &Path) -> ConfigResult<PathBuf> {
        let base = paths::backup_path(path, Local::now());
        let mut candidate = base.clone();
        let mut counter = 1u32;
        while files::exists(&candidate).await {
            candidate = PathBuf::from(format!("{}.{counter}", base.display()));
            counter += 1;
        }
        self.store.copy(path, &candidate).await?;
        tracing::debug!(
            original = %path.display(),
            backup = %candidate.display(),
            "Created config backup"
        );
        Ok(candidate)
    }

    async fn load_vscode_user(&self) -> ConfigResult<McpConfig> {
        let path = self.resolver.vscode_user_settings_path()?;
        if !files::exists(&path).await {
            return Ok(McpConfig::default());
        }
        let settings = self.store.read_json(&path).await?;
        Ok(McpConfig {
            mcp_servers: extract_vscode_servers(&settings),
        })
    }

    /// Write the server mapping into VS Code user settings, preserving the
    /// key shape already present (nested when the file is new) and every
    /// unrelated setting.
    async fn save_vscode_user(&self, servers: Map<String, Value>) -> ConfigResult<()> {
        let path = self.resolver.vscode_user_settings_path()?;
        let existed = files::exists(&path).await;
        let mut settings = if existed {
            self.store
                .read_json(&path)
                .await?
                .as_object()
                .cloned()
                .unwrap_or_default()
        } else {
            Map::new()
        };

        match detect_settings_shape(&settings) {
            Some(SettingsShape::Dotted) => {
                settings.insert("mcp.servers".to_string(), Value::Object(servers));
            }
            Some(SettingsShape::Flat) => {
                settings.insert(MCP_SERVERS_KEY.to_string(), Value::Object(servers));
            }
            Some(SettingsShape::Nested) | None => {
                let mcp = settings
                    .entry("mcp")
                    .or_insert_with(|| Value::Object(Map::new()));
                if !mcp.is_object() {
                    *mcp = Value::Object(Map::new());
                }
                if let Some(mcp) = mcp.as_object_mut() {
                    mcp.insert("servers".to_string(), Value::Object(servers));
                }
            }
        }

        if existed {
            self.create_backup(&path).await?;
        }
        self.store.write_json(&path, &Value::Object(settings)).await?;
        tracing::info!(path = %path.display(), "Saved VS Code user settings");
        Ok(())
    }
}

/// Probe the known shapes in fixed priority order: nested object, dotted
/// key, flat key. Returns an empty mapping when none matches.
fn extract_vscode_servers(settings: &Value) -> Map<String, Value> {
    let nested = settings
        .get("mcp")
        .and_then(|mcp| mcp.get("servers"))
        .and_then(Value::as_object);
    let dotted = settings.get("mcp.servers").and_then(Value::as_object);
    let flat = settings.get(MCP_SERVERS_KEY).and_then(Value::as_object);

    nested
        .or(dotted)
        .or(flat)
        .cloned()
        .unwrap_or_default()
}

fn detect_settings_shape(settings: &Map<String, Value>) -> Option<SettingsShape> {
    if settings.get("mcp.servers").map(Value::is_object) == Some(true) {
        Some(SettingsShape::Dotted)
    } else if settings
        .get("mcp")
        .and_then(|mcp| mcp.get("servers"))
        .map(Value::is_object)
        == Some(true)
    {
        Some(SettingsShape::Nested)
    } else if settings.get(MCP_SERVERS_KEY).map(Value::is_object) == Some(true) {
        Some(SettingsShape::Flat)
    } else {
        None
    }
}
