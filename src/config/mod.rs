//! Configuration management module.
//!
//! This module handles loading, saving, and managing application configuration,
//! including backend credentials, the generative-AI key, list paging and theme
//! preferences.

mod error;

pub use error::ConfigError;

use crate::error::AppError;
use crate::state::RevealConfig;
use log::*;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

const FILE_NAME: &str = "config.yml";
const DEFAULT_DIRECTORY_PATH: &str = ".config/tasky";

/// Connection settings for the document database.
///
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub endpoint: String,
    pub project_id: String,
    pub database_id: String,
    pub tasks_collection: String,
    pub projects_collection: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig {
            endpoint: "https://cloud.appwrite.io/v1".to_string(),
            project_id: String::new(),
            database_id: "tasky".to_string(),
            tasks_collection: "tasks".to_string(),
            projects_collection: "projects".to_string(),
            api_key: None,
            user_id: None,
        }
    }
}

/// Settings for the generative-language API.
///
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub endpoint: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for AiConfig {
    fn default() -> Self {
        AiConfig {
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-1.5-flash".to_string(),
            api_key: None,
        }
    }
}

/// Paging of long task lists.
///
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_delay_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stagger_ms: Option<u64>,
}

impl RevealSettings {
    pub fn to_reveal_config(&self) -> RevealConfig {
        let defaults = RevealConfig::with_counts(self.initial_count, self.page_size);
        RevealConfig {
            load_delay: self
                .load_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.load_delay),
            stagger: self
                .stagger_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.stagger),
            ..defaults
        }
    }
}

/// Oversees management of configuration file.
///
#[derive(Clone, Debug)]
pub struct Config {
    pub backend: BackendConfig,
    pub ai: AiConfig,
    pub reveal: RevealSettings,
    pub theme_name: String,
    file_path: Option<PathBuf>,
}

/// Define specification for configuration file.
///
#[derive(Serialize, Deserialize)]
struct FileSpec {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub reveal: RevealSettings,
    #[serde(default = "default_theme_name")]
    pub theme_name: String,
}

fn default_theme_name() -> String {
    "tokyo-night".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}

impl Config {
    /// Return a new empty instance.
    ///
    pub fn new() -> Config {
        Config {
            backend: BackendConfig::default(),
            ai: AiConfig::default(),
            reveal: RevealSettings::default(),
            theme_name: default_theme_name(),
            file_path: None,
        }
    }

    /// Whether enough credentials are present to reach the backend.
    ///
    pub fn is_signed_in(&self) -> bool {
        !self.backend.project_id.is_empty() && self.backend.api_key.is_some()
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Try to load an existing configuration from the disk using the custom
    /// directory if provided. A missing file leaves the defaults in place.
    ///
    pub fn load(&mut self, custom_path: Option<&str>) -> Result<(), AppError> {
        let dir_path = match custom_path {
            Some(path) => PathBuf::from(path),
            None => Config::default_path()?,
        };
        create_dir(&dir_path)?;

        let file_path = dir_path.join(FILE_NAME);
        if file_path.exists() {
            let contents = fs::read_to_string(&file_path).map_err(|source| ConfigError::Read {
                path: file_path.clone(),
                source,
            })?;
            let data: FileSpec =
                serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
                    path: file_path.clone(),
                    source,
                })?;
            self.backend = data.backend;
            self.ai = data.ai;
            self.reveal = data.reveal;
            self.theme_name = data.theme_name;
        } else {
            debug!("No configuration at {:?}; using defaults.", file_path);
        }
        self.file_path = Some(file_path);
        Ok(())
    }

    /// Serialize the configuration and write it to the disk, creating the
    /// parent directory if needed.
    ///
    pub fn save(&self) -> Result<(), AppError> {
        let file_path = self.file_path.as_ref().ok_or(ConfigError::FilePathNotSet)?;
        let data = FileSpec {
            backend: self.backend.clone(),
            ai: self.ai.clone(),
            reveal: self.reveal.clone(),
            theme_name: self.theme_name.clone(),
        };
        let content = serde_yaml::to_string(&data).map_err(ConfigError::Encode)?;
        if let Some(parent) = file_path.parent() {
            create_dir(parent)?;
        }
        fs::write(file_path, content).map_err(|source| ConfigError::Write {
            path: file_path.clone(),
            source,
        })?;
        info!("Saved configuration to {:?}", file_path);
        Ok(())
    }

    /// Store backend credentials and persist them.
    ///
    pub fn save_credentials(
        &mut self,
        endpoint: Option<&str>,
        project_id: &str,
        api_key: &str,
        user_id: Option<&str>,
    ) -> Result<(), AppError> {
        if project_id.trim().is_empty() {
            return Err(ConfigError::ProjectIdNotSet.into());
        }
        if let Some(endpoint) = endpoint {
            self.backend.endpoint = endpoint.to_owned();
        }
        self.backend.project_id = project_id.to_owned();
        self.backend.api_key = Some(api_key.to_owned());
        self.backend.user_id = user_id.map(str::to_owned);
        if self.file_path.is_none() {
            self.file_path = Some(Config::default_path()?.join(Path::new(FILE_NAME)));
        }
        self.save()
    }

    /// Returns the path buffer for the default configuration directory or an
    /// error if the home directory could not be found.
    ///
    fn default_path() -> Result<PathBuf, AppError> {
        match dirs::home_dir() {
            Some(home) => Ok(home.join(Path::new(DEFAULT_DIRECTORY_PATH))),
            None => Err(ConfigError::HomeDirectoryNotFound.into()),
        }
    }
}

fn create_dir(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|source| ConfigError::CreateDirectory {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::RevealConfig;

    fn load_from(dir: &Path) -> Config {
        let mut config = Config::new();
        config.load(dir.to_str()).unwrap();
        config
    }

    #[test]
    fn load_missing_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_from(dir.path());
        assert_eq!(config.backend, BackendConfig::default());
        assert_eq!(config.theme_name, "tokyo-night");
        assert!(!config.is_signed_in());
        assert_eq!(config.file_path(), Some(dir.path().join(FILE_NAME).as_path()));
    }

    #[test]
    fn load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(FILE_NAME),
            "backend:\n  project_id: tasky-prod\n  api_key: secret\nreveal:\n  page_size: 5\n",
        )
        .unwrap();

        let config = load_from(dir.path());
        assert_eq!(config.backend.project_id, "tasky-prod");
        assert_eq!(config.backend.database_id, "tasky");
        assert!(config.is_signed_in());
        assert_eq!(config.ai, AiConfig::default());

        let reveal = config.reveal.to_reveal_config();
        assert_eq!(reveal.page_size, 5);
        assert_eq!(reveal.initial_count, RevealConfig::default().initial_count);
    }

    #[test]
    fn load_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(FILE_NAME), "reveal:\n  page_size: many\n").unwrap();
        let mut config = Config::new();
        let error = config.load(dir.path().to_str()).unwrap_err();
        assert!(matches!(
            error,
            AppError::Config(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn save_credentials_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = load_from(dir.path());
        config
            .save_credentials(Some("http://localhost/v1"), "tasky-dev", "key", Some("user-1"))
            .unwrap();

        let reloaded = load_from(dir.path());
        assert_eq!(reloaded.backend.endpoint, "http://localhost/v1");
        assert_eq!(reloaded.backend.api_key.as_deref(), Some("key"));
        assert_eq!(reloaded.backend.user_id.as_deref(), Some("user-1"));
    }

    #[test]
    fn save_credentials_requires_project() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = load_from(dir.path());
        let error = config.save_credentials(None, " ", "key", None).unwrap_err();
        assert!(matches!(error, AppError::Config(ConfigError::ProjectIdNotSet)));
    }

    #[test]
    fn save_without_path() {
        let error = Config::new().save().unwrap_err();
        assert!(matches!(error, AppError::Config(ConfigError::FilePathNotSet)));
    }

    #[test]
    fn reveal_timings_from_settings() {
        let settings = RevealSettings {
            load_delay_ms: Some(0),
            stagger_ms: Some(20),
            ..RevealSettings::default()
        };
        let reveal = settings.to_reveal_config();
        assert_eq!(reveal.load_delay, Duration::ZERO);
        assert_eq!(reveal.stagger, Duration::from_millis(20));
    }
}
