//! Narrowing a task list to one project.

use crate::backend::TaskLike;
use std::fmt;
use std::sync::Arc;

/// Reserved selection value for tasks without a project.
///
pub const INBOX: &str = "inbox";

/// Which tasks a [`ProjectFilter`] lets through.
///
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ProjectSelection {
    #[default]
    All,
    Inbox,
    Project(String),
}

impl ProjectSelection {
    /// Interpret a selection value: absent means all tasks, [`INBOX`] means
    /// tasks without a project, anything else is a project id.
    ///
    pub fn from_id(value: Option<&str>) -> Self {
        match value {
            None => ProjectSelection::All,
            Some(INBOX) => ProjectSelection::Inbox,
            Some(id) => ProjectSelection::Project(id.to_owned()),
        }
    }

    /// Inverse of [`ProjectSelection::from_id`].
    ///
    pub fn as_id(&self) -> Option<&str> {
        match self {
            ProjectSelection::All => None,
            ProjectSelection::Inbox => Some(INBOX),
            ProjectSelection::Project(id) => Some(id),
        }
    }

    pub fn matches<T: TaskLike>(&self, task: &T) -> bool {
        match self {
            ProjectSelection::All => true,
            ProjectSelection::Inbox => task.project_id().is_none(),
            ProjectSelection::Project(id) => task.project_id() == Some(id.as_str()),
        }
    }
}

impl fmt::Display for ProjectSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectSelection::All => write!(f, "All projects"),
            ProjectSelection::Inbox => write!(f, "Inbox"),
            ProjectSelection::Project(id) => write!(f, "{}", id),
        }
    }
}

/// Derives the subset of `tasks` belonging to the selected project.
///
#[derive(Debug)]
pub struct ProjectFilter<T> {
    tasks: Option<Arc<[T]>>,
    selection: ProjectSelection,
}

impl<T: TaskLike + Clone> ProjectFilter<T> {
    pub fn new(tasks: Option<Arc<[T]>>) -> Self {
        ProjectFilter {
            tasks,
            selection: ProjectSelection::All,
        }
    }

    pub fn selection(&self) -> &ProjectSelection {
        &self.selection
    }

    pub fn selected_project_id(&self) -> Option<&str> {
        self.selection.as_id()
    }

    /// Replace the selection. Unknown project ids are accepted and simply
    /// match nothing.
    ///
    pub fn set_selected_project_id(&mut self, value: Option<&str>) {
        self.selection = ProjectSelection::from_id(value);
    }

    pub fn set_selection(&mut self, selection: ProjectSelection) {
        self.selection = selection;
    }

    pub fn set_tasks(&mut self, tasks: Option<Arc<[T]>>) {
        self.tasks = tasks;
    }

    /// The filtered tasks. With no selection the input list is returned as
    /// is, sharing the same allocation.
    ///
    pub fn filtered_tasks(&self) -> Arc<[T]> {
        let Some(tasks) = &self.tasks else {
            return Arc::from(Vec::new());
        };
        match self.selection {
            ProjectSelection::All => Arc::clone(tasks),
            _ => tasks
                .iter()
                .filter(|task| self.selection.matches(*task))
                .cloned()
                .collect(),
        }
    }

    pub fn filtered_count(&self) -> usize {
        match (&self.tasks, &self.selection) {
            (None, _) => 0,
            (Some(tasks), ProjectSelection::All) => tasks.len(),
            (Some(tasks), selection) => tasks.iter().filter(|task| selection.matches(*task)).count(),
        }
    }
}
