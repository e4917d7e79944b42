//! Configuration file discovery, loading and validation.

use crate::error::ConfigError;
use crate::types::LogictreeConfig;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// File name looked up next to the input file.
pub const CONFIG_FILE_NAME: &str = "logictree.toml";

/// The `logictree.toml` in the directory of `input`, if there is one.
pub fn find_config(input: &Path) -> Option<PathBuf> {
    let dir = match input.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let candidate = dir.join(CONFIG_FILE_NAME);
    candidate.is_file().then_some(candidate)
}

/// Loads and validates a configuration file.
pub fn load_config(path: &Path) -> Result<LogictreeConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    log::debug!("loaded configuration from {}", path.display());
    load_config_from_str(&content)
}

/// Parses and validates a configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<LogictreeConfig, ConfigError> {
    let config: LogictreeConfig = toml::from_str(content).map_err(|e| {
        let message = e.message().to_string();
        if message.contains("unknown variant") {
            ConfigError::InvalidValue(message)
        } else {
            ConfigError::Parse(e.to_string())
        }
    })?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &LogictreeConfig) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for name in &config.hash.order {
        if name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "hash.order contains an empty name".to_string(),
            ));
        }
        if !seen.insert(name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "hash.order lists `{name}` twice"
            )));
        }
    }
    if config.output.golden_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output.golden_dir must not be empty".to_string(),
        ));
    }
    Ok(())
}
