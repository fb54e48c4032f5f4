//! Backend-specific error types.

/// Errors that can occur during document database operations.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// API returned an error response
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Failed to deserialize API response
    #[error("Failed to deserialize API response: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// No signed-in user is available
    #[error("Not signed in")]
    Unauthenticated,

    /// Document not found
    #[error("Document not found: {id}")]
    NotFound { id: String },
}

impl BackendError {
    /// Whether the error means the credentials were rejected.
    ///
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            BackendError::Unauthenticated | BackendError::Api { status: 401, .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display() {
        let error = BackendError::Unauthenticated;
        assert!(error.to_string().contains("Not signed in"));

        let error = BackendError::NotFound {
            id: "123456".to_string(),
        };
        assert!(error.to_string().contains("Document not found"));
        assert!(error.to_string().contains("123456"));
    }

    #[test]
    fn test_backend_error_api_error() {
        let error = BackendError::Api {
            status: 404,
            message: "Not found".to_string(),
        };
        let error_str = error.to_string();
        assert!(error_str.contains("404"));
        assert!(error_str.contains("Not found"));
        assert!(!error.is_unauthorized());
    }

    #[test]
    fn test_backend_error_unauthorized() {
        let error = BackendError::Api {
            status: 401,
            message: "User (role: guests) missing scope".to_string(),
        };
        assert!(error.is_unauthorized());
        assert!(BackendError::Unauthenticated.is_unauthorized());
    }
}
