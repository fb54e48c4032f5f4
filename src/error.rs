//! Application-wide error types.
//!
//! This module defines the main error type hierarchy for the application,
//! allowing for type-safe error handling throughout the codebase.

pub use crate::ai::AiError;
pub use crate::backend::BackendError;
pub use crate::config::ConfigError;
pub use crate::state::StateError;

/// Main application error type.
///
/// This is the top-level error type that encompasses all error types
/// in the application.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Backend-related errors
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Task generation errors
    #[error("AI error: {0}")]
    Ai(#[from] AiError),

    /// State management errors
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Logger initialization errors
    #[error("Logger error: {0}")]
    Logger(String),

    /// Command-line usage errors
    #[error("{0}")]
    Usage(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_from_config_error() {
        let config_error = ConfigError::FilePathNotSet;
        let app_error: AppError = config_error.into();
        assert!(matches!(app_error, AppError::Config(_)));
        assert!(app_error.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_app_error_from_backend_error() {
        let backend_error = BackendError::Unauthenticated;
        let app_error: AppError = backend_error.into();
        assert!(matches!(app_error, AppError::Backend(_)));
        assert!(app_error.to_string().contains("Backend error"));
    }

    #[test]
    fn test_app_error_from_ai_error() {
        let app_error: AppError = AiError::EmptyPrompt.into();
        assert!(matches!(app_error, AppError::Ai(_)));
        assert!(app_error.to_string().contains("AI error"));
    }

    #[test]
    fn test_app_error_from_state_error() {
        let state_error = StateError::NoTaskSelected;
        let app_error: AppError = state_error.into();
        assert!(matches!(app_error, AppError::State(_)));
        assert!(app_error.to_string().contains("State error"));
    }

    #[test]
    fn test_app_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let app_error: AppError = io_error.into();
        assert!(matches!(app_error, AppError::Io(_)));
        assert!(app_error.to_string().contains("I/O error"));
    }

    #[test]
    fn test_app_error_usage() {
        let error = AppError::Usage("Unknown list 'someday'".to_string());
        assert_eq!(error.to_string(), "Unknown list 'someday'");
    }
}
