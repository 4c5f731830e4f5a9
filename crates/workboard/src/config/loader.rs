use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::schema::{BackendConfig, BoardConfig};
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../schema/board-config-v1.json");

/// Returns `~/.workboard/config.json`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|h| h.join(".workboard").join("config.json"))
        .ok_or(ConfigError::NoHomeDir)
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<BoardConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

/// Loads the config at `path`, or the local default when the file is absent.
pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<BoardConfig, ConfigError> {
    let path = path.as_ref();
    if path.exists() {
        load_config(path)
    } else {
        log::info!(
            "No config at {}, using the local store",
            crate::sanitize::redact_path(path)
        );
        Ok(BoardConfig::local_default())
    }
}

pub fn load_config_from_str(content: &str) -> Result<BoardConfig, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: BoardConfig = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn validate_config(config: &BoardConfig) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    if config.poll_interval_secs == 0 {
        return Err(ConfigError::Validation {
            message: "pollIntervalSecs must be positive".to_string(),
        });
    }

    let retention = &config.retention;
    if retention.completed_cap == 0 || retention.deleted_cap == 0 || retention.deleted_display_cap == 0 {
        return Err(ConfigError::Validation {
            message: "Retention caps must be positive".to_string(),
        });
    }

    if let BackendConfig::Supabase(cfg) = &config.backend {
        if !(cfg.url.starts_with("https://") || cfg.url.starts_with("http://")) {
            return Err(ConfigError::Validation {
                message: format!(
                    "Store URL must start with http:// or https://: {}",
                    crate::sanitize::redact_url(&cfg.url)
                ),
            });
        }
    }

    let mut seen = HashSet::new();
    for creator in &config.creators {
        if creator.trim().is_empty() {
            return Err(ConfigError::Validation {
                message: "Creator names must not be empty".to_string(),
            });
        }
        if !seen.insert(creator.as_str()) {
            return Err(ConfigError::Validation {
                message: format!("Duplicate creator: {}", creator),
            });
        }
    }

    Ok(())
}
