//! Error taxonomy for the configuration core.
//!
//! Every core operation reports errors to its caller; nothing is retried or
//! logged-and-swallowed at this layer. The API layer translates these into
//! HTTP responses.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A fixed path could not be constructed (unsupported platform or a
    /// missing platform environment variable). Fatal: there is no fallback.
    #[error("Failed to resolve config path: {0}")]
    Resolution(String),

    /// The file exists but could not be read or is not valid JSON.
    #[error("Failed to read {}: {message}", path.display())]
    Read { path: PathBuf, message: String },

    /// The document failed structural validation. Carries every defect
    /// found, not just the first.
    #[error("Invalid configuration: {}", errors.join(", "))]
    Validation { errors: Vec<String> },

    /// I/O failure while writing the target file.
    #[error("Failed to write {}: {message}", path.display())]
    Write { path: PathBuf, message: String },

    /// The pre-write backup copy could not be made. A save must abort on
    /// this: overwriting without a backup would destroy the only recovery
    /// path.
    #[error("Failed to back up {}: {message}", path.display())]
    Backup { path: PathBuf, message: String },

    /// A path failed the null-byte or containment check. Treated as a
    /// programming or tampering error, never silently corrected.
    #[error("Unsafe path rejected: {}", path.display())]
    PathSafety { path: PathBuf },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
