//! Task generation error types.

/// Errors that can occur while generating tasks.
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// API returned an error response
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// No API key configured
    #[error("No generative-language API key configured")]
    MissingApiKey,

    /// Prompt was empty
    #[error("Prompt cannot be empty")]
    EmptyPrompt,

    /// Model reply could not be turned into tasks
    #[error("Invalid model response: {0}")]
    InvalidResponse(String),
}
