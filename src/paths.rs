//! Configuration location resolution.
//!
//! Knows the fixed set of configuration scopes, their discovery rules, and
//! their priority order. Locations are recomputed on every call — config
//! files are created and deleted externally between requests, so nothing
//! here may be cached.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};
use crate::files;

/// Reserved file name for project-scope configs, searched upward from the
/// working directory.
pub const PROJECT_CONFIG_FILENAME: &str = ".mcp.json";

/// File name used inside editor config directories (`.cursor`, `.vscode`).
pub const EDITOR_CONFIG_FILENAME: &str = "mcp.json";

/// User-global config file under the home directory. Shared with other
/// tools and may carry unrelated top-level fields.
pub const USER_CONFIG_FILENAME: &str = ".claude.json";

/// Configuration scope, in resolution priority order. Inbound scope
/// selectors go through [`ConfigScope::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfigScope {
    Project,
    Cursor,
    Vscode,
    User,
    ClaudeDesktop,
    /// VS Code user `settings.json`. Addressable only by explicit request;
    /// never part of the priority-ordered candidate list.
    VscodeUser,
}

impl ConfigScope {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "project" => Some(Self::Project),
            "cursor" => Some(Self::Cursor),
            "vscode" => Some(Self::Vscode),
            "user" => Some(Self::User),
            "claude-desktop" => Some(Self::ClaudeDesktop),
            "vscode-user" => Some(Self::VscodeUser),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Cursor => "cursor",
            Self::Vscode => "vscode",
            Self::User => "user",
            Self::ClaudeDesktop => "claude-desktop",
            Self::VscodeUser => "vscode-user",
        }
    }
}

/// A candidate configuration file for one scope. Computed fresh on every
/// resolution request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigLocation {
    pub path: PathBuf,
    pub scope: ConfigScope,
    pub exists: bool,
    pub display_name: String,
}

/// Resolves candidate configuration locations across scopes.
///
/// The home and start directories are injected so tests can run against a
/// scratch tree; production uses the real home directory and the process
/// working directory.
#[derive(Debug, Clone)]
pub struct PathResolver {
    home_dir: PathBuf,
    start_dir: PathBuf,
}

impl PathResolver {
    pub fn new() -> ConfigResult<Self> {
        let home_dir = dirs::home_dir().ok_or_else(|| {
            ConfigError::Resolution("home directory could not be determined".to_string())
        })?;
        let start_dir = std::env::current_dir().map_err(|e| {
            ConfigError::Resolution(format!("working directory unavailable: {e}"))
        })?;
        Ok(Self {
            home_dir,
            start_dir,
        })
    }

    pub fn with_dirs(home_dir: impl Into<PathBuf>, start_dir: impl Into<PathBuf>) -> Self {
        Self {
            home_dir: home_dir.into(),
            start_dir: start_dir.into(),
        }
    }

    pub fn home_dir(&self) -> &Path {
        &self.home_dir
    }

    /// Search for `relative` in the start directory and each successive
    /// parent, stopping at (and including) the home directory or the
    /// filesystem root, whichever comes first.
    async fn find_upward(&self, relative: &Path) -> Option<PathBuf> {
        let mut current = self.start_dir.clone();
        loop {
            let candidate = current.join(relative);
            if files::exists(&candidate).await {
                return Some(candidate);
            }
            // Never escape above the home directory.
            if current == self.home_dir {
                return None;
            }
            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                // Reached the filesystem root.
                None => return None,
            }
        }
    }

    /// Find the nearest project `.mcp.json`, or `None` when the chain up to
    /// the home directory (or root) holds none.
    pub async fn find_project_config(&self) -> Option<PathBuf> {
        self.find_upward(Path::new(PROJECT_CONFIG_FILENAME)).await
    }

    pub async fn find_cursor_config(&self) -> Option<PathBuf> {
        self.find_upward(&Path::new(".cursor").join(EDITOR_CONFIG_FILENAME))
            .await
    }

    pub async fn find_vscode_config(&self) -> Option<PathBuf> {
        self.find_upward(&Path::new(".vscode").join(EDITOR_CONFIG_FILENAME))
            .await
    }

    /// User-global config path (`~/.claude.json`).
    pub fn user_config_path(&self) -> PathBuf {
        self.home_dir.join(USER_CONFIG_FILENAME)
    }

    pub fn user_cursor_config_path(&self) -> PathBuf {
        self.home_dir.join(".cursor").join(EDITOR_CONFIG_FILENAME)
    }

    pub fn user_vscode_config_path(&self) -> PathBuf {
        self.home_dir.join(".vscode").join(EDITOR_CONFIG_FILENAME)
    }

    /// Legacy Claude Desktop config path. Platform-specific; fails fast when
    /// the platform is unsupported or a required environment variable is
    /// missing, since no further fallback exists.
    pub fn claude_desktop_config_path(&self) -> ConfigResult<PathBuf> {
        if cfg!(target_os = "macos") {
            Ok(self
                .home_dir
                .join("Library/Application Support/Claude/claude_desktop_config.json"))
        } else if cfg!(target_os = "windows") {
            let appdata = std::env::var("APPDATA").map_err(|_| {
                ConfigError::Resolution("APPDATA environment variable is not set".to_string())
            })?;
            Ok(PathBuf::from(appdata).join("Claude/claude_desktop_config.json"))
        } else if cfg!(target_os = "linux") {
            Ok(self.home_dir.join(".config/Claude/claude_desktop_config.json"))
        } else {
            Err(ConfigError::Resolution(format!(
                "unsupported platform: {}",
                std::env::consts::OS
            )))
        }
    }

    /// VS Code user `settings.json` path. Platform-specific like the
    /// Claude Desktop path.
    pub fn vscode_user_settings_path(&self) -> ConfigResult<PathBuf> {
        if cfg!(target_os = "macos") {
            Ok(self
                .home_dir
                .join("Library/Application Support/Code/User/settings.json"))
        } else if cfg!(target_os = "windows") {
            let appdata = std::env::var("APPDATA").map_err(|_| {
                ConfigError::Resolution("APPDATA environment variable is not set".to_string())
            })?;
            Ok(PathBuf::from(appdata).join("Code/User/settings.json"))
        } else if cfg!(target_os = "linux") {
            Ok(self.home_dir.join(".config/Code/User/settings.json"))
        } else {
            Err(ConfigError::Resolution(format!(
                "unsupported platform: {}",
                std::env::consts::OS
            )))
        }
    }

    /// All candidate locations in fixed priority order:
    /// project > cursor > vscode > user > claude-desktop.
    ///
    /// Every scope contributes exactly one entry regardless of which files
    /// exist, so the list shape is stable for UI rendering and for
    /// first-existing selection.
    pub async fn resolve_candidates(&self) -> ConfigResult<Vec<ConfigLocation>> {
        let mut locations = Vec::with_capacity(5);

        // 1. Project (.mcp.json, upward search)
        let (path, exists) = match self.find_project_config().await {
            Some(path) => (path, true),
            None => (self.start_dir.join(PROJECT_CONFIG_FILENAME), false),
        };
        locations.push(ConfigLocation {
            display_name: format!(".mcp.json ({})", parent_dir_label(&path)),
            path,
            scope: ConfigScope::Project,
            exists,
        });

        // 2. Cursor, 3. VS Code (project-rooted, user-level fallback)
        locations.push(
            self.editor_location(ConfigScope::Cursor, ".cursor", "Cursor Config")
                .await,
        );
        locations.push(
            self.editor_location(ConfigScope::Vscode, ".vscode", "VS Code Config")
                .await,
        );

        // 4. User (~/.claude.json)
        let user_path = self.user_config_path();
        let user_exists = files::exists(&user_path).await;
        locations.push(ConfigLocation {
            path: user_path,
            scope: ConfigScope::User,
            exists: user_exists,
            display_name: "Claude Code Config".to_string(),
        });

        // 5. Claude Desktop (legacy, platform-specific fixed path)
        let desktop_path = self.claude_desktop_config_path()?;
        let desktop_exists = files::exists(&desktop_path).await;
        locations.push(ConfigLocation {
            path: desktop_path,
            scope: ConfigScope::ClaudeDesktop,
            exists: desktop_exists,
            display_name: "Claude Desktop Config".to_string(),
        });

        Ok(locations)
    }

    /// Build the single candidate for an editor scope: prefer the
    /// project-rooted path, fall back to the user-level path; `exists`
    /// reflects either being present.
    async fn editor_location(
        &self,
        scope: ConfigScope,
        dir_name: &str,
        fallback_label: &str,
    ) -> ConfigLocation {
        let project_path = self
            .find_upward(&Path::new(dir_name).join(EDITOR_CONFIG_FILENAME))
            .await;
        let user_path = self.home_dir.join(dir_name).join(EDITOR_CONFIG_FILENAME);
        let user_exists = files::exists(&user_path).await;

        match project_path {
            Some(path) => ConfigLocation {
                display_name: format!(
                    "{dir_name}/{EDITOR_CONFIG_FILENAME} ({})",
                    project_dir_label(&path, dir_name)
                ),
                path,
                scope,
                exists: true,
            },
            None => ConfigLocation {
                path: user_path,
                scope,
                exists: user_exists,
                display_name: fallback_label.to_string(),
            },
        }
    }

    /// The location for an explicitly requested scope. Returns the scope's
    /// canonical path marked non-existent when no file is present, which
    /// supports "create a new config in this scope" flows.
    pub async fn location_for_scope(&self, scope: ConfigScope) -> ConfigResult<ConfigLocation> {
        if scope == ConfigScope::VscodeUser {
            let path = self.vscode_user_settings_path()?;
            let exists = files::exists(&path).await;
            return Ok(ConfigLocation {
                path,
                scope,
                exists,
                display_name: "VS Code User Settings".to_string(),
            });
        }

        let candidates = self.resolve_candidates().await?;
        candidates
            .into_iter()
            .find(|location| location.scope == scope)
            .ok_or_else(|| {
                ConfigError::Resolution(format!("no candidate for scope {}", scope.as_str()))
            })
    }

    /// The active location: the requested scope's location when one is
    /// given, otherwise the first existing candidate in priority order.
    pub async fn resolve_active(
        &self,
        scope: Option<ConfigScope>,
    ) -> ConfigResult<Option<ConfigLocation>> {
        match scope {
            Some(scope) => Ok(Some(self.location_for_scope(scope).await?)),
            None => {
                let candidates = self.resolve_candidates().await?;
                Ok(candidates.into_iter().find(|location| location.exists))
            }
        }
    }

    /// The path load/save should target: the active location's path, or the
    /// user config path when nothing exists anywhere (so a first save has
    /// somewhere to go).
    pub async fn config_path(&self, scope: Option<ConfigScope>) -> ConfigResult<PathBuf> {
        match self.resolve_active(scope).await? {
            Some(location) => Ok(location.path),
            None => Ok(self.user_config_path()),
        }
    }
}

/// Backup file name for a config path: `<path>.backup.<date>_<time>`, with
/// second resolution. Callers are responsible for disambiguating collisions.
pub fn backup_path(config_path: &Path, timestamp: DateTime<Local>) -> PathBuf {
    let stamp = timestamp.format("%Y-%m-%d_%H%M%S");
    PathBuf::from(format!("{}.backup.{stamp}", config_path.display()))
}

/// Label for a project config: the name of the directory holding the file.
fn parent_dir_label(path: &Path) -> String {
    path.parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "/".to_string())
}

/// Label for an editor config: the project directory above the editor
/// directory (`/work/app/.cursor/mcp.json` labels as `app`).
fn project_dir_label(path: &Path, dir_name: &str) -> String {
    let parent = match path.parent() {
        Some(parent) => parent,
        None => return "/".to_string(),
    };
    let labeled = if parent.file_name().map(|n| n == dir_name).unwrap_or(false) {
        parent.parent().unwrap_or(parent)
    } else {
        parent
    };
    labeled
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "/".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn resolver_in(temp: &TempDir) -> PathResolver {
        let home = temp.path().join("home/user");
        let start = home.join("work/project/src");
        std::fs::create_dir_all(&start).unwrap();
        PathResolver::with_dirs(home, start)
    }

    #[test]
    fn scope_parse_round_trips() {
        for scope in [
            ConfigScope::Project,
            ConfigScope::Cursor,
            ConfigScope::Vscode,
            ConfigScope::User,
            ConfigScope::ClaudeDesktop,
            ConfigScope::VscodeUser,
        ] {
            assert_eq!(ConfigScope::parse(scope.as_str()), Some(scope));
        }
        assert_eq!(ConfigScope::parse("workspace"), None);
    }

    #[tokio::test]
    async fn upward_search_finds_config_in_ancestor() {
        let temp = TempDir::new().unwrap();
        let resolver = resolver_in(&temp);
        let config_path = temp.path().join("home/user/work/project/.mcp.json");
        std::fs::write(&config_path, "{}").unwrap();

        assert_eq!(resolver.find_project_config().await, Some(config_path));
    }

    #[tokio::test]
    async fn upward_search_stops_at_home_directory() {
        let temp = TempDir::new().unwrap();
        let resolver = resolver_in(&temp);
        // A config above the home directory must never be picked up.
        std::fs::write(temp.path().join("home/.mcp.json"), "{}").unwrap();

        assert_eq!(resolver.find_project_config().await, None);
    }

    #[tokio::test]
    async fn upward_search_returns_none_when_nothing_found() {
        let temp = TempDir::new().unwrap();
        let resolver = resolver_in(&temp);

        assert_eq!(resolver.find_project_config().await, None);
        assert_eq!(resolver.find_cursor_config().await, None);
        assert_eq!(resolver.find_vscode_config().await, None);
    }

    #[tokio::test]
    async fn candidates_keep_priority_order_regardless_of_existence() {
        let temp = TempDir::new().unwrap();
        let resolver = resolver_in(&temp);

        let candidates = resolver.resolve_candidates().await.unwrap();
        let scopes: Vec<ConfigScope> = candidates.iter().map(|l| l.scope).collect();
        assert_eq!(
            scopes,
            vec![
                ConfigScope::Project,
                ConfigScope::Cursor,
                ConfigScope::Vscode,
                ConfigScope::User,
                ConfigScope::ClaudeDesktop,
            ]
        );
        assert!(candidates.iter().all(|l| !l.exists));
    }

    #[tokio::test]
    async fn candidates_keep_priority_order_when_files_exist() {
        let temp = TempDir::new().unwrap();
        let resolver = resolver_in(&temp);

        std::fs::write(temp.path().join("home/user/work/project/.mcp.json"), "{}").unwrap();
        let cursor = temp.path().join("home/user/work/project/.cursor/mcp.json");
        std::fs::create_dir_all(cursor.parent().unwrap()).unwrap();
        std::fs::write(&cursor, "{}").unwrap();
        std::fs::write(resolver.user_config_path(), "{}").unwrap();

        let candidates = resolver.resolve_candidates().await.unwrap();
        let scopes: Vec<ConfigScope> = candidates.iter().map(|l| l.scope).collect();
        assert_eq!(
            scopes,
            vec![
                ConfigScope::Project,
                ConfigScope::Cursor,
                ConfigScope::Vscode,
                ConfigScope::User,
                ConfigScope::ClaudeDesktop,
            ]
        );

        let exists: Vec<bool> = candidates.iter().map(|l| l.exists).collect();
        assert_eq!(exists, vec![true, true, false, true, false]);
    }

    #[tokio::test]
    async fn active_location_picks_first_existing() {
        let temp = TempDir::new().unwrap();
        let resolver = resolver_in(&temp);

        // Only the user config exists.
        std::fs::write(resolver.user_config_path(), "{}").unwrap();
        let active = resolver.resolve_active(None).await.unwrap().unwrap();
        assert_eq!(active.scope, ConfigScope::User);

        // A project config outranks it.
        let project = temp.path().join("home/user/work/project/.mcp.json");
        std::fs::write(&project, "{}").unwrap();
        let active = resolver.resolve_active(None).await.unwrap().unwrap();
        assert_eq!(active.scope, ConfigScope::Project);
        assert_eq!(active.path, project);
    }

    #[tokio::test]
    async fn explicit_scope_returns_canonical_path_when_missing() {
        let temp = TempDir::new().unwrap();
        let resolver = resolver_in(&temp);

        let location = resolver
            .resolve_active(Some(ConfigScope::Project))
            .await
            .unwrap()
            .unwrap();
        assert!(!location.exists);
        assert_eq!(
            location.path,
            temp.path().join("home/user/work/project/src/.mcp.json")
        );
    }

    #[tokio::test]
    async fn editor_scope_prefers_project_path_over_user_fallback() {
        let temp = TempDir::new().unwrap();
        let resolver = resolver_in(&temp);

        // User-level fallback only.
        let user_cursor = resolver.user_cursor_config_path();
        std::fs::create_dir_all(user_cursor.parent().unwrap()).unwrap();
        std::fs::write(&user_cursor, "{}").unwrap();

        let location = resolver
            .location_for_scope(ConfigScope::Cursor)
            .await
            .unwrap();
        assert_eq!(location.path, user_cursor);
        assert!(location.exists);

        // Project-rooted config wins once present.
        let project_cursor = temp.path().join("home/user/work/project/.cursor/mcp.json");
        std::fs::create_dir_all(project_cursor.parent().unwrap()).unwrap();
        std::fs::write(&project_cursor, "{}").unwrap();

        let location = resolver
            .location_for_scope(ConfigScope::Cursor)
            .await
            .unwrap();
        assert_eq!(location.path, project_cursor);
        assert!(location.display_name.contains("project"));
    }

    #[tokio::test]
    async fn config_path_falls_back_to_user_path() {
        let temp = TempDir::new().unwrap();
        let resolver = resolver_in(&temp);

        let path = resolver.config_path(None).await.unwrap();
        assert_eq!(path, resolver.user_config_path());
    }

    #[test]
    fn backup_path_carries_timestamp() {
        let timestamp = Local.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
        let path = backup_path(Path::new("/tmp/config.json"), timestamp);
        assert_eq!(
            path,
            PathBuf::from("/tmp/config.json.backup.2025-03-14_092653")
        );
    }
}
