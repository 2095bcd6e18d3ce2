use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::explorer::ExplorerSettings;
use crate::policy::Role;
use crate::rubber_band::DEFAULT_DRAG_THRESHOLD;

const CONFIG_VERSION: u32 = 1;
const DEFAULT_DISMISS_SECS: u64 = 5;
const MAX_DISMISS_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NotedeckConfig {
    pub version: u32,
    pub session: SessionConfig,
    #[serde(default)]
    pub library: LibraryConfig,
    #[serde(default)]
    pub explorer: ExplorerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SessionConfig {
    pub role: Role,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct LibraryConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ExplorerConfig {
    #[serde(default = "default_drag_threshold")]
    pub drag_threshold: f64,
    #[serde(default = "default_dismiss_secs")]
    pub warning_dismiss_secs: u64,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            drag_threshold: default_drag_threshold(),
            warning_dismiss_secs: default_dismiss_secs(),
        }
    }
}

fn default_drag_threshold() -> f64 {
    DEFAULT_DRAG_THRESHOLD
}

fn default_dismiss_secs() -> u64 {
    DEFAULT_DISMISS_SECS
}

impl Default for NotedeckConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            session: SessionConfig { role: Role::Staff },
            library: LibraryConfig::default(),
            explorer: ExplorerConfig::default(),
        }
    }
}

impl NotedeckConfig {
    pub fn explorer_settings(&self) -> ExplorerSettings {
        ExplorerSettings {
            drag_threshold: self.explorer.drag_threshold,
            dismiss_after: Duration::from_secs(self.explorer.warning_dismiss_secs),
        }
    }

    /// The configured library file, or `library.toml` beside the config file.
    pub fn library_path(&self, config_path: &Path) -> PathBuf {
        match &self.library.path {
            Some(path) => PathBuf::from(path),
            None => config_path
                .parent()
                .map(|dir| dir.join("library.toml"))
                .unwrap_or_else(|| PathBuf::from("library.toml")),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not resolve home directory for config path")]
    HomeDirectoryUnavailable,
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to write config at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid config: {message}")]
    Validation { message: String },
}

pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or(ConfigError::HomeDirectoryUnavailable)?;
    Ok(base_dirs
        .home_dir()
        .join(".config")
        .join("notedeck")
        .join("config.toml"))
}

pub fn load_config(path: &Path) -> Result<NotedeckConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let parsed: NotedeckConfig = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    validate_config(&parsed)?;
    Ok(parsed)
}

pub fn write_config(path: &Path, config: &NotedeckConfig) -> Result<(), ConfigError> {
    validate_config(config)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let serialized = toml::to_string(config)?;
    fs::write(path, serialized).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

pub fn validate_config(config: &NotedeckConfig) -> Result<(), ConfigError> {
    if config.version != CONFIG_VERSION {
        return Err(validation(format!("version must be {CONFIG_VERSION}")));
    }

    let threshold = config.explorer.drag_threshold;
    if !threshold.is_finite() || threshold <= 0.0 {
        return Err(validation(
            "explorer.drag_threshold must be a positive number".to_string(),
        ));
    }

    if !(1..=MAX_DISMISS_SECS).contains(&config.explorer.warning_dismiss_secs) {
        return Err(validation(format!(
            "explorer.warning_dismiss_secs must be between 1 and {MAX_DISMISS_SECS}"
        )));
    }

    if config
        .library
        .path
        .as_deref()
        .is_some_and(|path| path.trim().is_empty())
    {
        return Err(validation(
            "library.path must be non-empty when set".to_string(),
        ));
    }

    Ok(())
}

fn validation(message: String) -> ConfigError {
    ConfigError::Validation { message }
}
