//! Viewer configuration and log file resolution.
//!
//! Loads optional settings from `<config dir>/collab/config.toml`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// User-level configuration loaded from `config.toml`
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ViewerConfig {
    /// Collaboration log to read instead of the default location
    pub log_file: Option<PathBuf>,
    /// Set to false to disable colored output
    pub color: Option<bool>,
}

/// Directory under the platform config dir holding `config.toml`
pub const CONFIG_DIR_NAME: &str = "collab";

/// The config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

impl ViewerConfig {
    /// Load configuration from `dir`.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: ViewerConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(Some(config))
    }

    /// Load from the platform config directory, if there is one.
    pub fn load_default() -> Result<Option<Self>> {
        match dirs::config_dir() {
            Some(dir) => Self::load(&dir.join(CONFIG_DIR_NAME)),
            None => Ok(None),
        }
    }

    /// Whether colors are enabled. Defaults to true.
    pub fn color(&self) -> bool {
        self.color.unwrap_or(true)
    }
}

/// `~/.openclaw/collab/collaboration.jsonl`, where the log writer puts it.
pub fn default_log_path() -> Result<PathBuf> {
    let home = dirs::home_dir().with_context(|| "Could not determine home directory")?;
    Ok(home
        .join(".openclaw")
        .join("collab")
        .join("collaboration.jsonl"))
}

/// Pick the log file.
/// Priority: `--file` / `COLLAB_FILE` > config `log_file` > default location
pub fn resolve_log_path(cli_file: Option<PathBuf>, config: Option<&ViewerConfig>) -> Result<PathBuf> {
    if let Some(path) = cli_file {
        return Ok(path);
    }
    if let Some(path) = config.and_then(|c| c.log_file.clone()) {
        return Ok(path);
    }
    default_log_path()
}
