//! Where sagenb-export finds the SageNB data directory.
//!
//! The config file is optional. When it is missing the data directory
//! defaults to `~/.sage`; the first data directory given on the command line
//! is remembered so later runs need no argument.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    Read {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    Parse {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to write config file at {config_path}: {source}")]
    Write {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// SageNB data directory, the one holding `sage_notebook.sagenb`.
    #[serde(default = "Config::default_dot_sage")]
    pub dot_sage: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dot_sage: Self::default_dot_sage(),
        }
    }
}

impl Config {
    pub fn new(dot_sage: impl Into<PathBuf>) -> Self {
        Self {
            dot_sage: dot_sage.into(),
        }
    }

    /// `Ok(None)` when no config file exists.
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
            config_path: config_path.to_path_buf(),
            source,
        })?;

        let mut config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            config_path: config_path.to_path_buf(),
            source,
        })?;
        config.dot_sage = expand_path(&config.dot_sage).unwrap_or(config.dot_sage);

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        Self::load_from_path(Self::config_path())
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> Result<(), ConfigError> {
        let config_path = config_path.as_ref();
        let write_error = |source| ConfigError::Write {
            config_path: config_path.to_path_buf(),
            source,
        };
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content).map_err(write_error)
    }

    /// Store `dot_sage` in a new config file at `config_path`.
    ///
    /// An existing config file is never overwritten; returns whether one was
    /// written.
    pub fn remember_at<P: AsRef<Path>>(config_path: P, dot_sage: &Path) -> Result<bool, ConfigError> {
        let config_path = config_path.as_ref();
        if config_path.exists() {
            return Ok(false);
        }
        Self::new(dot_sage).save_to_path(config_path)?;
        Ok(true)
    }

    pub fn remember(dot_sage: &Path) -> Result<bool, ConfigError> {
        Self::remember_at(Self::config_path(), dot_sage)
    }

    pub fn config_path() -> PathBuf {
        PathBuf::from(shellexpand::tilde("~/.config/sagenb-export").as_ref()).join("config.toml")
    }

    /// Where Sage keeps its notebook data unless told otherwise.
    pub fn default_dot_sage() -> PathBuf {
        PathBuf::from(shellexpand::tilde("~/.sage").as_ref())
    }
}

/// Expands `~` and `$VAR`; `None` when a variable is undefined.
fn expand_path(path: &Path) -> Option<PathBuf> {
    let path_str = path.to_string_lossy();
    shellexpand::full(&path_str)
        .ok()
        .map(|expanded| PathBuf::from(expanded.as_ref()))
}
