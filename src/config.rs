use crate::update::validate::UploadLimits;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const GLOBAL_STATE_DIR: &str = ".progressctl";
pub const GLOBAL_SETTINGS_FILE_NAME: &str = "config.yaml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid yaml in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("settings validation failed: {0}")]
    Settings(String),
    #[error("failed to resolve home directory for global config path")]
    HomeDirectoryUnavailable,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Base URL of the project-management API, e.g. `https://pm.example.gov/api`.
    pub api_base: String,
    /// Local state root for drafts and logs; defaults to `~/.progressctl`.
    #[serde(default)]
    pub state_root: Option<PathBuf>,
    #[serde(default)]
    pub upload: UploadSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadSettings {
    #[serde(default = "default_max_file_size_bytes")]
    pub max_file_size_bytes: u64,
    #[serde(default = "default_max_file_count")]
    pub max_file_count: usize,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_file_size_bytes: default_max_file_size_bytes(),
            max_file_count: default_max_file_count(),
        }
    }
}

fn default_max_file_size_bytes() -> u64 {
    crate::update::files::MAX_FILE_SIZE_BYTES
}

fn default_max_file_count() -> usize {
    crate::update::files::DEFAULT_MAX_FILE_COUNT
}

pub fn default_global_config_path() -> Result<PathBuf, ConfigError> {
    let home = std::env::var_os("HOME").ok_or(ConfigError::HomeDirectoryUnavailable)?;
    Ok(PathBuf::from(home)
        .join(GLOBAL_STATE_DIR)
        .join(GLOBAL_SETTINGS_FILE_NAME))
}

pub fn default_state_root() -> Result<PathBuf, ConfigError> {
    let home = std::env::var_os("HOME").ok_or(ConfigError::HomeDirectoryUnavailable)?;
    Ok(PathBuf::from(home).join(GLOBAL_STATE_DIR))
}

pub fn load_global_settings() -> Result<Settings, ConfigError> {
    let path = default_global_config_path()?;
    let settings = Settings::from_path(&path)?;
    settings.validate()?;
    Ok(settings)
}

impl Settings {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let api_base = self.api_base.trim();
        if api_base.is_empty() {
            return Err(ConfigError::Settings(
                "`api_base` must be non-empty".to_string(),
            ));
        }
        if !api_base.starts_with("http://") && !api_base.starts_with("https://") {
            return Err(ConfigError::Settings(
                "`api_base` must start with http:// or https://".to_string(),
            ));
        }
        if let Some(state_root) = &self.state_root {
            if !state_root.is_absolute() {
                return Err(ConfigError::Settings(
                    "`state_root` must be an absolute path".to_string(),
                ));
            }
        }
        if self.upload.max_file_size_bytes == 0 {
            return Err(ConfigError::Settings(
                "`upload.max_file_size_bytes` must be > 0".to_string(),
            ));
        }
        if self.upload.max_file_count == 0 {
            return Err(ConfigError::Settings(
                "`upload.max_file_count` must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn resolve_state_root(&self) -> Result<PathBuf, ConfigError> {
        match &self.state_root {
            Some(path) => Ok(path.clone()),
            None => default_state_root(),
        }
    }

    pub fn upload_limits(&self) -> UploadLimits {
        UploadLimits {
            max_file_size_bytes: self.upload.max_file_size_bytes,
            max_file_count: self.upload.max_file_count,
        }
    }
}
