//! Configuration-specific error types.

use std::path::PathBuf;

/// Errors that can occur while reading or writing `config.yml`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("No configuration file selected")]
    FilePathNotSet,

    /// `login` was given a blank project id
    #[error("Backend project id not set")]
    ProjectIdNotSet,

    #[error("Failed to find home directory")]
    HomeDirectoryNotFound,

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to create directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file exists but is not valid YAML for the expected layout
    #[error("Invalid configuration in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Failed to encode configuration: {0}")]
    Encode(#[source] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_name_the_path() {
        let error = ConfigError::Write {
            path: PathBuf::from("/home/me/.config/tasky/config.yml"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let message = error.to_string();
        assert!(message.contains("/home/me/.config/tasky/config.yml"));
        assert!(message.contains("denied"));
    }

    #[test]
    fn parse_error_names_the_path() {
        let source = serde_yaml::from_str::<Vec<u8>>("backend: {").unwrap_err();
        let error = ConfigError::Parse {
            path: PathBuf::from("config.yml"),
            source,
        };
        assert!(error.to_string().starts_with("Invalid configuration in config.yml"));
    }

    #[test]
    fn unit_variants() {
        assert!(ConfigError::ProjectIdNotSet
            .to_string()
            .contains("project id"));
        assert!(ConfigError::HomeDirectoryNotFound
            .to_string()
            .contains("home directory"));
    }
}
