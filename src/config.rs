use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, error, info};
use serde::{Deserialize, Serialize};

use crate::{NotesError, Result};

/// Application configuration settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Log filter used when `RUST_LOG` is not set
    pub log_level: String,

    /// Default order for `list`: oldest note first
    pub notes_ascending: bool,

    /// Default order for `comments`: newest comment first
    pub comments_descending: bool,

    /// Print command results as JSON instead of text
    pub json_output: bool,

    /// Owner assigned to notes and comments created without `--owner`
    pub default_owner_id: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            notes_ascending: true,
            comments_descending: false,
            json_output: false,
            default_owner_id: 0,
        }
    }
}

impl Config {
    /// Location of the config file when none is given on the command line
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "notes-service")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Loads the configuration from `path`, or from the default location.
    ///
    /// A missing file yields the defaults. An explicitly requested file that
    /// does not exist is an error.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match Self::default_path() {
                Some(p) => (p, false),
                None => {
                    debug!("No config directory available, using defaults");
                    return Ok(Config::default());
                }
            },
        };

        if !path.exists() {
            if explicit {
                error!("Config file does not exist: {}", path.display());
                return Err(NotesError::ConfigError {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            debug!("No config at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = serde_json::from_str(&content).map_err(|e| {
            error!("Failed to parse config {}: {}", path.display(), e);
            NotesError::ConfigError {
                message: format!("invalid config {}: {}", path.display(), e),
            }
        })?;

        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Writes a default config to `path`, or to the default location.
    ///
    /// An existing file is left alone and reported as an error.
    pub fn init(path: Option<&Path>) -> Result<PathBuf> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path().ok_or_else(|| NotesError::ConfigError {
                message: "no config directory available".to_string(),
            })?,
        };

        if path.exists() {
            return Err(NotesError::ConfigError {
                message: format!("config file already exists: {}", path.display()),
            });
        }

        Config::default().save(&path)?;
        info!("Wrote default configuration to {}", path.display());
        Ok(path)
    }

    /// Writes the configuration as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        debug!("Saved configuration to {}", path.display());
        Ok(())
    }
}
