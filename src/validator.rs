//! Structural validation of configuration documents.
//!
//! Pure and side-effect free: validation walks raw JSON values and
//! accumulates every defect into human-readable messages, so a caller sees
//! all problems in one pass instead of fixing them one at a time.
//!
//! [`is_command_safe`] is a separate, advisory guard for pre-screening
//! user-supplied commands. It is deliberately not composed into
//! [`validate_document`]: a structurally valid but shell-unsafe command is
//! accepted by save, and callers who want the stricter check invoke it
//! themselves.

use serde::Serialize;
use serde_json::Value;

use crate::types::MCP_SERVERS_KEY;

/// Outcome of a validation pass: a validity flag plus every error found.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Validate a whole configuration document (anything with an `mcpServers`
/// field). A missing or non-object server mapping short-circuits the
/// entry-level checks; there is nothing meaningful to validate below it.
pub fn validate_document(document: &Value) -> ValidationReport {
    let object = match document.as_object() {
        Some(object) => object,
        None => {
            return ValidationReport::from_errors(vec!["Config must be a JSON object".to_string()])
        }
    };

    let servers = match object.get(MCP_SERVERS_KEY) {
        None => {
            return ValidationReport::from_errors(vec![format!(
                "{MCP_SERVERS_KEY} field is required"
            )])
        }
        Some(value) => match value.as_object() {
            Some(servers) => servers,
            None => {
                return ValidationReport::from_errors(vec![format!(
                    "{MCP_SERVERS_KEY} must be an object"
                )])
            }
        },
    };

    let mut errors = Vec::new();
    for (name, server) in servers {
        errors.extend(validate_server(server, Some(name)).errors);
    }
    ValidationReport::from_errors(errors)
}

/// Validate a single server entry. Error messages are prefixed with the
/// server name when one is known, so multi-entry reports stay readable.
pub fn validate_server(server: &Value, name: Option<&str>) -> ValidationReport {
    let prefix = match name {
        Some(name) => format!("Server \"{name}\": "),
        None => String::new(),
    };

    let object = match server.as_object() {
        Some(object) => object,
        None => {
            return ValidationReport::from_errors(vec![format!(
                "{prefix}Server config must be an object"
            )])
        }
    };

    let mut errors = Vec::new();

    match object.get("command").and_then(Value::as_str) {
        Some(command) if !command.trim().is_empty() => {}
        _ => errors.push(format!(
            "{prefix}Command is required and must be a non-empty string"
        )),
    }

    if let Some(args) = object.get("args") {
        match args.as_array() {
            Some(args) => {
                for (index, arg) in args.iter().enumerate() {
                    if !arg.is_string() {
                        errors.push(format!("{prefix}Arg at index {index} must be a string"));
                    }
                }
            }
            None => errors.push(format!("{prefix}Args must be an array")),
        }
    }

    if let Some(env) = object.get("env") {
        errors.extend(validate_env(env, name).errors);
    }

    if let Some(disabled) = object.get("disabled") {
        if !disabled.is_boolean() {
            errors.push(format!("{prefix}Disabled must be a boolean"));
        }
    }

    ValidationReport::from_errors(errors)
}

/// Validate an `env` mapping: non-empty string keys, string values.
pub fn validate_env(env: &Value, server_name: Option<&str>) -> ValidationReport {
    let prefix = match server_name {
        Some(name) => format!("Server \"{name}\": "),
        None => String::new(),
    };

    let object = match env.as_object() {
        Some(object) => object,
        None => {
            return ValidationReport::from_errors(vec![format!(
                "{prefix}Environment variables must be an object"
            )])
        }
    };

    let mut errors = Vec::new();
    for (key, value) in object {
        if key.trim().is_empty() {
            errors.push(format!(
                "{prefix}Environment variable key must be a non-empty string"
            ));
        }
        if !value.is_string() {
            errors.push(format!(
                "{prefix}Environment variable \"{key}\" value must be a string"
            ));
        }
    }
    ValidationReport::from_errors(errors)
}

/// Advisory hardening check for user-supplied commands: rejects shell
/// metacharacters, parent-directory traversal and home-directory shorthand.
pub fn is_command_safe(command: &str) -> bool {
    let trimmed = command.trim();
    if trimmed.is_empty() {
        return false;
    }
    const SHELL_METACHARACTERS: &[char] = &[';', '&', '|', '`', '$', '(', ')'];
    if trimmed.contains(SHELL_METACHARACTERS) {
        return false;
    }
    !(trimmed.contains("..") || trimmed.contains("~/"))
}
