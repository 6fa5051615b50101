//! User configuration, read from `~/.attendify/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

const DATA_DIR_NAME: &str = ".attendify";
const CONFIG_FILE_NAME: &str = "config.toml";
const DEFAULT_LOG_LEVEL: &str = "warn";

/// `~/.attendify`
pub fn default_data_dir() -> Result<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?;
    Ok(home_dir.join(DATA_DIR_NAME))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the store keeps its files. Defaults to `~/.attendify`.
    pub data_dir: Option<PathBuf>,
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Reject attended counts above their totals instead of accepting them.
    pub enforce_count_invariants: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            enforce_count_invariants: false,
        }
    }
}

impl Config {
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).context("Invalid configuration")
    }

    pub fn default_path() -> Result<PathBuf> {
        Ok(default_data_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Loads `path`, or the default location when `None`. A missing file
    /// yields the defaults; an unreadable one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("In {}", path.display()))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_data_dir(),
        }
    }
}
