//! Configuration types for gitmirror

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};

pub const ENV_STORAGE_ROOT: &str = "GITMIRROR_STORAGE_ROOT";
pub const ENV_GIT_BINARY: &str = "GITMIRROR_GIT_BINARY";
pub const ENV_REMOTE_CHECK_TIMEOUT: &str = "GITMIRROR_REMOTE_CHECK_TIMEOUT_SECS";

const REGISTRY_FILE_NAME: &str = "mirrors.json";

fn default_timeout_secs() -> u64 {
    30
}

fn default_git_binary() -> String {
    "git".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Settings for the mirror service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MirrorSettings {
    /// Directory under which every clone is created
    #[serde(default)]
    pub storage_root: PathBuf,

    /// Upper bound for the remote reachability probe
    #[serde(default = "default_timeout_secs")]
    pub remote_check_timeout_secs: u64,

    /// git executable to run
    #[serde(default = "default_git_binary")]
    pub git_binary: String,

    /// Where mirror records are kept, `<storageRoot>/mirrors.json` when unset
    #[serde(default)]
    pub registry_file: Option<PathBuf>,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for MirrorSettings {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::new(),
            remote_check_timeout_secs: default_timeout_secs(),
            git_binary: default_git_binary(),
            registry_file: None,
            log_level: default_log_level(),
        }
    }
}

impl MirrorSettings {
    /// Load settings from a JSON or YAML file, chosen by extension
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&content).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            }),
            Some("yaml") | Some("yml") => {
                serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
                    path: path.to_path_buf(),
                    source,
                })
            }
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    /// File (if any), then `GITMIRROR_*` environment overrides, then an
    /// explicit storage root, then validation
    pub fn load(path: Option<&Path>, storage_root: Option<PathBuf>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_overrides(|key| std::env::var(key).ok())?;
        if let Some(root) = storage_root {
            settings.storage_root = root;
        }
        settings.validate()?;
        Ok(settings)
    }

    /// Apply overrides from a key lookup (the process environment in `load`)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup(ENV_STORAGE_ROOT).filter(|v| !v.trim().is_empty()) {
            self.storage_root = PathBuf::from(root);
        }
        if let Some(git) = lookup(ENV_GIT_BINARY).filter(|v| !v.trim().is_empty()) {
            self.git_binary = git;
        }
        if let Some(raw) = lookup(ENV_REMOTE_CHECK_TIMEOUT) {
            self.remote_check_timeout_secs =
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidOverride {
                        key: ENV_REMOTE_CHECK_TIMEOUT.to_string(),
                        value: raw.clone(),
                    })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage_root.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                field: "storageRoot",
                reason: "must be set".to_string(),
            });
        }
        if !self.storage_root.is_absolute() {
            return Err(ConfigError::Invalid {
                field: "storageRoot",
                reason: format!("'{}' is not an absolute path", self.storage_root.display()),
            });
        }
        if self.remote_check_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "remoteCheckTimeoutSecs",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.git_binary.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "gitBinary",
                reason: "must not be blank".to_string(),
            });
        }
        Ok(())
    }

    pub fn remote_check_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_check_timeout_secs)
    }

    pub fn registry_path(&self) -> PathBuf {
        self.registry_file
            .clone()
            .unwrap_or_else(|| self.storage_root.join(REGISTRY_FILE_NAME))
    }
}
