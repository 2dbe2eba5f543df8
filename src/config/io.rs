//! Configuration I/O - Loading, environment overrides, and validation
//!
//! Layered precedence: defaults < config file < environment variables.

use std::path::{Path, PathBuf};

use super::types::Config;
use crate::error::{Error, Result};

/// Default config file name, looked up in the working directory
const DEFAULT_CONFIG_FILE: &str = "twelfbox.json";

/// Load configuration with layered precedence:
/// 1. Config file (`TWELFBOX_CONFIG` env var, or `twelfbox.json` if present),
///    otherwise defaults
/// 2. Environment variable overrides (includes `.env`)
pub fn load_config() -> Result<Config> {
    let config_path = std::env::var("TWELFBOX_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

    let mut config = if config_path.exists() {
        load_config_from_path(&config_path)?
    } else {
        Config::default()
    };

    apply_env_overrides(&mut config);

    Ok(config)
}

/// Load configuration from a specific path
pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!(
            "Failed to read config file {}: {}",
            path.display(),
            e
        ))
    })?;

    // Detect format by extension
    let config: Config = if path.extension().is_some_and(|ext| ext == "toml") {
        toml::from_str(&content).map_err(|e| Error::Config(format!("Invalid TOML config: {}", e)))?
    } else {
        // JSON5 is a superset of JSON, so plain .json files parse too
        json5::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid JSON config: {}", e)))?
    };

    Ok(config)
}

/// Apply environment variable overrides to an existing config.
///
/// Loads `.env` if present, then overlays any set variables. Env vars have
/// the highest precedence in the config layering: defaults < file < env.
pub fn apply_env_overrides(config: &mut Config) {
    dotenvy::dotenv().ok();

    if let Ok(bind) = std::env::var("BIND") {
        config.server.bind = bind;
    }
    if let Ok(port) = std::env::var("PORT") {
        if let Ok(v) = port.parse() {
            config.server.port = v;
        }
    }
    if let Ok(max) = std::env::var("MAX_BODY_BYTES") {
        if let Ok(v) = max.parse() {
            config.server.max_body_bytes = v;
        }
    }
    if let Ok(command) = std::env::var("TWELF_COMMAND") {
        config.checker.command = PathBuf::from(command);
    }
    if let Ok(root) = std::env::var("WORKSPACE_ROOT") {
        config.checker.workspace_root = PathBuf::from(root);
    }
    if let Ok(code) = std::env::var("KILL_EXIT_CODE") {
        if let Ok(v) = code.parse() {
            config.checker.kill_exit_code = v;
        }
    }
    if let Ok(placement) = std::env::var("TOKEN_PLACEMENT") {
        if let Ok(v) = placement.parse() {
            config.decoder.token_placement = v;
        }
    }
}

/// Validate a loaded configuration before serving.
///
/// Checks that the checker command resolves to an existing executable and
/// that the body ceiling is usable.
pub fn validate_config(config: &Config) -> Result<()> {
    let command = &config.checker.command;
    if command.is_absolute() {
        if !command.exists() {
            return Err(Error::Config(format!(
                "Checker command not found: {}",
                command.display()
            )));
        }
    } else {
        which::which(command).map_err(|_| {
            Error::Config(format!(
                "Checker command not found in PATH: {}",
                command.display()
            ))
        })?;
    }

    if config.server.max_body_bytes == 0 {
        return Err(Error::Config(
            "max_body_bytes must be greater than zero".to_string(),
        ));
    }

    Ok(())
}
