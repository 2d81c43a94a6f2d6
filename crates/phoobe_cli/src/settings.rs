//! Tool settings.
//!
//! Settings are read from an optional `phoobe.yaml` in the working
//! directory. Command line flags and `PHOOBE_*` environment variables are
//! applied on top of the file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_SETTINGS_FILE: &str = "phoobe.yaml";
pub const DEFAULT_ENVIRONMENT_FILE: &str = "environment.yaml";
pub const DEFAULT_ENVIRONMENT_NAME: &str = "phoobe";
pub const DEFAULT_CACHE_FILE: &str = ".phoobe/environments.json";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

pub type SettingsResult<T> = Result<T, SettingsError>;

/// Effective tool settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Environment description to load
    pub environment_file: PathBuf,

    /// Name used as resource name prefix and cache key
    pub environment_name: String,

    /// Embed shell provisioners as software config
    #[serde(alias = "use_softwareconfig")]
    pub use_software_config: bool,

    /// Record of created environments
    pub cache_file: PathBuf,

    /// Network name to id mapping used in standalone mode
    pub network_ids: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            environment_file: PathBuf::from(DEFAULT_ENVIRONMENT_FILE),
            environment_name: DEFAULT_ENVIRONMENT_NAME.to_string(),
            use_software_config: false,
            cache_file: PathBuf::from(DEFAULT_CACHE_FILE),
            network_ids: None,
        }
    }
}

impl Settings {
    /// Load settings from a file. A missing file yields the defaults.
    pub fn load(path: &Path) -> SettingsResult<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings file at {:?}, using defaults", path);
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(SettingsError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        Self::from_yaml(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    pub fn with_environment_file(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.environment_file = path;
        }
        self
    }

    pub fn with_environment_name(mut self, name: Option<String>) -> Self {
        if let Some(name) = name {
            self.environment_name = name;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.environment_file, PathBuf::from("environment.yaml"));
        assert_eq!(settings.environment_name, "phoobe");
        assert!(!settings.use_software_config);
        assert_eq!(settings.cache_file, PathBuf::from(".phoobe/environments.json"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings = Settings::from_yaml("environment_name: lab\nuse_softwareconfig: true\n").unwrap();
        assert_eq!(settings.environment_name, "lab");
        assert!(settings.use_software_config);
        assert_eq!(settings.environment_file, PathBuf::from("environment.yaml"));
    }

    #[test]
    fn test_empty_file() {
        assert_eq!(Settings::from_yaml("").unwrap(), Settings::default());
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::default()
            .with_environment_file(Some(PathBuf::from("lab.yaml")))
            .with_environment_name(None);
        assert_eq!(settings.environment_file, PathBuf::from("lab.yaml"));
        assert_eq!(settings.environment_name, "phoobe");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("phoobe.yaml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phoobe.yaml");
        fs::write(&path, "use_software_config: [1, 2").unwrap();
        assert!(matches!(Settings::load(&path), Err(SettingsError::Parse { .. })));
    }
}
