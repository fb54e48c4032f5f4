use chrono::{DateTime, Utc};
use fake::Dummy;
use serde::{Deserialize, Serialize};

/// Reference from a task to its project.
///
/// The backend returns relationships either as a bare document id or as the
/// embedded related document, depending on the query. Both shapes are kept
/// here and collapsed by [`ProjectRef::id`].
///
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProjectRef {
    Id(String),
    Embedded(ProjectStub),
}

/// Minimal embedded project document.
///
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectStub {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ProjectRef {
    /// Return the effective project id.
    ///
    pub fn id(&self) -> &str {
        match self {
            ProjectRef::Id(id) => id,
            ProjectRef::Embedded(stub) => &stub.id,
        }
    }

    /// Return the project name when the reference embeds one.
    ///
    pub fn name(&self) -> Option<&str> {
        match self {
            ProjectRef::Id(_) => None,
            ProjectRef::Embedded(stub) => stub.name.as_deref(),
        }
    }
}

impl From<&str> for ProjectRef {
    fn from(id: &str) -> Self {
        ProjectRef::Id(id.to_owned())
    }
}

/// Anything the project filter can narrow: an identified record that may
/// belong to a project.
///
pub trait TaskLike {
    fn id(&self) -> &str;

    fn project_ref(&self) -> Option<&ProjectRef>;

    /// Normalized project id, absent for inbox tasks.
    ///
    fn project_id(&self) -> Option<&str> {
        self.project_ref().map(ProjectRef::id)
    }
}

/// Defines account data structure.
///
#[derive(Clone, Debug, Dummy, PartialEq, Eq, Deserialize)]
pub struct Account {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// Defines project data structure.
///
#[derive(Clone, Debug, Dummy, PartialEq, Eq, Deserialize)]
pub struct Project {
    #[serde(rename = "$id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color_name: String,
    #[serde(default)]
    pub color_hex: String,
    #[serde(rename = "userId", default)]
    pub user_id: String,
}

/// Defines task data structure.
///
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Task {
    #[serde(rename = "$id")]
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: bool,
    #[serde(rename = "projectId", default)]
    pub project: Option<ProjectRef>,
    #[serde(rename = "userId", default)]
    pub user_id: String,
    #[serde(rename = "$createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "$updatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TaskLike for Task {
    fn id(&self) -> &str {
        &self.id
    }

    fn project_ref(&self) -> Option<&ProjectRef> {
        self.project.as_ref()
    }
}

/// Payload for a task that does not exist yet.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub content: String,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: bool,
    #[serde(rename = "projectId", default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

/// Payload for a project that does not exist yet.
///
#[derive(Clone, Debug, Dummy, PartialEq, Eq, Serialize)]
pub struct NewProject {
    pub name: String,
    pub color_name: String,
    pub color_hex: String,
}

/// Partial task update; unset fields are left untouched.
///
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(rename = "projectId", skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Option<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn project_ref_from_bare_id() {
        let task: Task = serde_json::from_value(json!({
            "$id": "t1",
            "content": "Buy milk",
            "projectId": "p1",
        }))
        .unwrap();
        assert_eq!(task.project_id(), Some("p1"));
        assert_eq!(task.project.as_ref().and_then(ProjectRef::name), None);
    }

    #[test]
    fn project_ref_from_embedded_document() {
        let task: Task = serde_json::from_value(json!({
            "$id": "t1",
            "content": "Buy milk",
            "projectId": { "$id": "p2", "name": "Errands", "color_hex": "#ff0000" },
        }))
        .unwrap();
        assert_eq!(task.project_id(), Some("p2"));
        assert_eq!(task.project.as_ref().and_then(ProjectRef::name), Some("Errands"));
    }

    #[test]
    fn project_ref_absent() {
        let task: Task = serde_json::from_value(json!({
            "$id": "t1",
            "content": "Buy milk",
            "projectId": null,
            "due_date": "2024-03-01T09:00:00.000+00:00",
        }))
        .unwrap();
        assert_eq!(task.project_id(), None);
        assert!(task.due_date.is_some());
        assert!(!task.completed);
    }

    #[test]
    fn task_patch_skips_unset_fields() {
        let patch = TaskPatch {
            completed: Some(true),
            due_date: Some(None),
            ..TaskPatch::default()
        };
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({ "completed": true, "due_date": null })
        );
    }
}
