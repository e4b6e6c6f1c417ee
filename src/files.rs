//! Guarded JSON file I/O.
//!
//! Every read and write passes a path safety check: no null bytes, and the
//! lexically normalized target must sit inside an allowed root. The check
//! stops accidental or tampered path escapes when paths are assembled from
//! partially external input; it is not a general sandbox.

use serde_json::Value;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

use crate::error::{ConfigError, ConfigResult};

/// Whether a file exists. Never errors; any access failure counts as
/// non-existence.
pub async fn exists(path: &Path) -> bool {
    fs::metadata(path).await.is_ok()
}

/// JSON file store restricted to a set of allowed root directories.
///
/// Production roots are the home directory and the process working
/// directory; tests inject a scratch directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    allowed_roots: Vec<PathBuf>,
}

impl FileStore {
    pub fn new() -> ConfigResult<Self> {
        let home_dir = dirs::home_dir().ok_or_else(|| {
            ConfigError::Resolution("home directory could not be determined".to_string())
        })?;
        let cwd = std::env::current_dir().map_err(|e| {
            ConfigError::Resolution(format!("working directory unavailable: {e}"))
        })?;
        Ok(Self::with_roots(vec![home_dir, cwd]))
    }

    pub fn with_roots(allowed_roots: Vec<PathBuf>) -> Self {
        Self { allowed_roots }
    }

    /// Whether a path passes the safety check. `extra_root` widens the
    /// allowed set for backup destinations, which live next to the file
    /// being backed up.
    pub fn is_path_safe(&self, path: &Path, extra_root: Option<&Path>) -> bool {
        if path.to_string_lossy().contains('\0') {
            return false;
        }
        let normalized = normalize_path(path);
        self.allowed_roots
            .iter()
            .map(PathBuf::as_path)
            .chain(extra_root)
            .any(|root| normalized.starts_with(normalize_path(root)))
    }

    fn check(&self, path: &Path, extra_root: Option<&Path>) -> ConfigResult<()> {
        if self.is_path_safe(path, extra_root) {
            Ok(())
        } else {
            Err(ConfigError::PathSafety {
                path: path.to_path_buf(),
            })
        }
    }

    /// Read and parse a JSON file. The underlying I/O or syntax error
    /// message is carried in the failure so callers can surface it.
    pub async fn read_json(&self, path: &Path) -> ConfigResult<Value> {
        self.check(path, None)?;
        let content = fs::read_to_string(path).await.map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Serialize a value to pretty-printed JSON and write it, creating
    /// parent directories as needed. Serialization is deterministic: the
    /// same document always produces identical bytes.
    pub async fn write_json(&self, path: &Path, value: &Value) -> ConfigResult<()> {
        self.check(path, None)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| ConfigError::Write {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        }
        let content = serde_json::to_string_pretty(value).map_err(|e| ConfigError::Write {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        fs::write(path, content).await.map_err(|e| ConfigError::Write {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Copy a file, for backup creation only. The destination may live in
    /// the source's directory even when that directory is outside the
    /// allowed roots.
    pub async fn copy(&self, source: &Path, destination: &Path) -> ConfigResult<()> {
        self.check(source, None)?;
        self.check(destination, source.parent())?;
        if !exists(source).await {
            return Err(ConfigError::Backup {
                path: source.to_path_buf(),
                message: "source file does not exist".to_string(),
            });
        }
        fs::copy(source, destination)
            .await
            .map(|_| ())
            .map_err(|e| ConfigError::Backup {
                path: destination.to_path_buf(),
                message: e.to_string(),
            })
    }
}

/// Resolve `.` and `..` components lexically, without touching the
/// filesystem. `..` never climbs above the root of the path.
fn normalize_path(path: &Path) -> PathBuf {
    let mut components = path.components().peekable();
    let mut normalized = if let Some(component @ Component::Prefix(..)) = components.peek().copied()
    {
        components.next();
        PathBuf::from(component.as_os_str())
    } else {
        PathBuf::new()
    };

    for component in components {
        match component {
            Component::Prefix(..) => {}
            Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            Component::Normal(part) => normalized.push(part),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn store_in(temp: &TempDir) -> FileStore {
        FileStore::with_roots(vec![temp.path().to_path_buf()])
    }

    #[tokio::test]
    async fn exists_never_errors() {
        assert!(!exists(Path::new("/definitely/not/here.json")).await);
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        let path = temp.path().join("deep/nested/config.json");
        let value = json!({ "mcpServers": { "fs": { "command": "npx" } } });

        store.write_json(&path, &value).await.unwrap();
        let loaded = store.read_json(&path).await.unwrap();
        assert_eq!(loaded, value);
    }

    #[tokio::test]
    async fn write_is_deterministic() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        let value = json!({ "b": 1, "a": { "nested": true } });

        let first = temp.path().join("first.json");
        let second = temp.path().join("second.json");
        store.write_json(&first, &value).await.unwrap();
        store.write_json(&second, &value).await.unwrap();

        assert_eq!(
            std::fs::read_to_string(first).unwrap(),
            std::fs::read_to_string(second).unwrap()
        );
    }

    #[tokio::test]
    async fn read_reports_invalid_json_with_message() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        let path = temp.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        match store.read_json(&path).await {
            Err(ConfigError::Read { message, .. }) => assert!(!message.is_empty()),
            other => panic!("expected read error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejects_path_outside_allowed_roots() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);

        let err = store
            .write_json(Path::new("/etc/mcp-settings-test.json"), &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::PathSafety { .. }));
    }

    #[tokio::test]
    async fn rejects_traversal_escaping_the_root() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        let sneaky = temp.path().join("sub/../../../../etc/passwd");

        assert!(!store.is_path_safe(&sneaky, None));
        let err = store.read_json(&sneaky).await.unwrap_err();
        assert!(matches!(err, ConfigError::PathSafety { .. }));
    }

    #[test]
    fn rejects_null_bytes() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        let path = temp.path().join("bad\0name.json");

        assert!(!store.is_path_safe(&path, None));
    }

    #[test]
    fn traversal_inside_the_root_is_allowed() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        let path = temp.path().join("a/b/../c.json");

        assert!(store.is_path_safe(&path, None));
    }

    #[tokio::test]
    async fn copy_fails_when_source_missing() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);

        let err = store
            .copy(&temp.path().join("missing.json"), &temp.path().join("out.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::Backup { .. }));
    }

    #[tokio::test]
    async fn copy_duplicates_content() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        let source = temp.path().join("config.json");
        let destination = temp.path().join("config.json.backup.x");
        std::fs::write(&source, "{\"mcpServers\":{}}").unwrap();

        store.copy(&source, &destination).await.unwrap();
        assert_eq!(
            std::fs::read_to_string(&destination).unwrap(),
            "{\"mcpServers\":{}}"
        );
    }
}
