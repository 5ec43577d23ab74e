//! Run-control file discovery and loading.
//!
//! A run-control ("rc") file caches the answers of a previous run for one
//! module/command. Discovery walks up from a start directory and, at each
//! level, checks these names in order:
//!
//! 1. `.{module}-{command}rc` (JSON, falling back to YAML)
//! 2. `.{module}-{command}rc.json`
//! 3. `.{module}-{command}rc.yaml`
//! 4. `.{module}-{command}rc.yml`

use crate::error::{KickstartError, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Suffixes tried after the base rc name, in priority order.
pub const RC_SUFFIXES: [&str; 4] = ["", ".json", ".yaml", ".yml"];

/// File name of the rc file for a module/command, without suffix.
pub fn rc_file_name(module: &str, command: &str) -> String {
    format!(".{}-{}rc", module, command)
}

/// Find the nearest rc file at or above `start`.
pub fn find_rc_file(start: &Path, module: &str, command: &str) -> Option<PathBuf> {
    let base = rc_file_name(module, command);
    let mut current = start.to_path_buf();

    loop {
        for suffix in RC_SUFFIXES {
            let candidate = current.join(format!("{}{}", base, suffix));
            if candidate.is_file() {
                return Some(candidate);
            }
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load a config file, choosing the format from its extension.
///
/// # Errors
///
/// Returns `ConfigParseError` if the content is not a valid mapping.
pub fn load_config_file(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)?;
    parse_config(&content, path)
}

/// Parse config content; `.json` is JSON, `.yaml`/`.yml` is YAML and
/// anything else is tried as JSON and then as YAML.
///
/// An empty document yields an empty object.
pub fn parse_config(content: &str, source_path: &Path) -> Result<Value> {
    let parse_error = |message: String| KickstartError::ConfigParseError {
        path: source_path.to_path_buf(),
        message,
    };

    let extension = source_path.extension().and_then(|e| e.to_str());
    let value = match extension {
        Some("json") => serde_json::from_str(content).map_err(|e| parse_error(e.to_string()))?,
        Some("yaml") | Some("yml") => parse_yaml(content).map_err(parse_error)?,
        _ => match serde_json::from_str(content) {
            Ok(value) => value,
            Err(_) => parse_yaml(content).map_err(parse_error)?,
        },
    };

    match value {
        Value::Null => Ok(Value::Object(Map::new())),
        Value::Object(_) => Ok(value),
        other => Err(parse_error(format!(
            "expected a mapping at the top level, found {}",
            type_name(&other)
        ))),
    }
}

fn parse_yaml(content: &str) -> std::result::Result<Value, String> {
    if content.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_yaml::from_str(content).map_err(|e| e.to_string())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
