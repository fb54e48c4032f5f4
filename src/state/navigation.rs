//! Navigation-related state types.
//!
//! This module contains enums and types related to navigation, views, focus
//! and text prompts.

use super::smart_list::SmartList;

/// Specifying the different foci.
///
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Focus {
    Sidebar,
    Tasks,
}

/// Specifying the different views.
///
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum View {
    Smart(SmartList),
    Project(String),
}

impl Default for View {
    fn default() -> Self {
        View::Smart(SmartList::Today)
    }
}

/// Specifying what the open text prompt is collecting.
///
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum PromptKind {
    /// Task content, optionally followed by ` @YYYY-MM-DD`.
    AddTask,
    ProjectName,
    /// Natural-language description used to generate the project's tasks.
    ProjectPrompt { name: String },
}

impl PromptKind {
    pub fn title(&self) -> &'static str {
        match self {
            PromptKind::AddTask => "New task (content @YYYY-MM-DD)",
            PromptKind::ProjectName => "New project name",
            PromptKind::ProjectPrompt { .. } => "Describe the project (empty for no AI tasks)",
        }
    }
}
