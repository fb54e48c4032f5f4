//! State management-specific error types.

/// Errors that can occur during state operations.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// No task is selected in the task list
    #[error("No task selected")]
    NoTaskSelected,

    /// Project not found in state
    #[error("Project not found: {id}")]
    ProjectNotFound { id: String },

    /// Due date could not be parsed
    #[error("Invalid due date '{0}', expected YYYY-MM-DD")]
    InvalidDueDate(String),

    /// Prompt submitted without content
    #[error("Task content cannot be empty")]
    EmptyContent,

    /// Network event channel closed
    #[error("Network event channel closed")]
    ChannelClosed,
}
