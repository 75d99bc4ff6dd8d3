pub mod types;

use crate::error::{ConfigError, Result};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = ".cloudport.toml";

/// Environment variable holding the assistant API key
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

/// Environment variable overriding the executor workspace root
pub const WORKSPACE_ROOT_ENV: &str = "CLOUDPORT_WORKSPACE_ROOT";

/// Get the global config file path (~/.cloudport.toml)
pub fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(CONFIG_FILE_NAME))
}

/// Get the local config file path (dir/.cloudport.toml)
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE_NAME)
}

/// Load configuration.
///
/// An explicit path must exist and parse. Without one, the local config in
/// the current directory is tried first, then the global config, then the
/// defaults. Environment overrides are applied last.
pub fn load_config(explicit: Option<&Path>) -> Result<types::Config> {
    let mut config = match explicit {
        Some(path) => read_config(path)?,
        None => discover_config(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

fn discover_config() -> types::Config {
    let local = std::env::current_dir().ok().map(|dir| local_config_path(&dir));

    for candidate in local.into_iter().chain(global_config_path()) {
        if !candidate.exists() {
            continue;
        }
        match read_config(&candidate) {
            Ok(config) => {
                log::debug!("Loaded configuration from {}", candidate.display());
                return config;
            }
            Err(e) => log::warn!("Ignoring {}: {}", candidate.display(), e),
        }
    }

    types::Config::default()
}

fn read_config(path: &Path) -> Result<types::Config> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    parse_config(&content)
}

/// Parse a TOML configuration document.
pub fn parse_config(content: &str) -> Result<types::Config> {
    let config: types::Config =
        toml::from_str(content).map_err(|e| ConfigError::ParsingFailed(e.to_string()))?;

    if config.executor.command_timeout_secs == 0 {
        return Err(ConfigError::InvalidValue {
            key: "executor.command_timeout_secs".to_string(),
            message: "must be greater than zero".to_string(),
        }
        .into());
    }

    Ok(config)
}

/// Apply environment overrides; `lookup` stands in for `std::env::var`.
pub fn apply_env_overrides<F>(config: &mut types::Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
        config.assistant.api_key = Some(key);
    }
    if let Some(root) = lookup(WORKSPACE_ROOT_ENV).filter(|r| !r.trim().is_empty()) {
        config.executor.workspace_root = PathBuf::from(root);
    }
}
