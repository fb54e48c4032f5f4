//! Backend module.
//!
//! Tasks and projects live in a hosted document database. This module holds
//! the narrow capability traits the rest of the application talks to, the
//! REST implementation of them, and the typed task/project operations built
//! on top.

mod client;
mod error;
mod query;
mod resource;

pub use error::BackendError;
pub use query::Query;
pub use resource::*;

use crate::config::Config;
use crate::state::{DayBounds, SmartList};
use async_trait::async_trait;
use client::Client;
use log::*;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::sync::OnceCell;

/// Document CRUD over named collections.
///
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_document(&self, collection: &str, id: &str) -> Result<Value, BackendError>;

    async fn list_documents(
        &self,
        collection: &str,
        queries: &[Query],
    ) -> Result<Vec<Value>, BackendError>;

    async fn create_document(&self, collection: &str, data: Value) -> Result<Value, BackendError>;

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        data: Value,
    ) -> Result<Value, BackendError>;

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), BackendError>;
}

/// Identity of the signed-in user.
///
#[async_trait]
pub trait Session: Send + Sync {
    async fn current_user_id(&self) -> Result<String, BackendError>;
}

/// REST implementation of [`DocumentStore`] and [`Session`].
///
pub struct Appwrite {
    client: Client,
    database_id: String,
    user_id: OnceCell<String>,
}

impl Appwrite {
    /// Returns a new instance for the given configuration.
    ///
    pub fn new(config: &Config) -> Appwrite {
        debug!(
            "Initializing backend client for project {} at {}...",
            config.backend.project_id, config.backend.endpoint
        );
        let user_id = match &config.backend.user_id {
            Some(id) => OnceCell::from(id.to_owned()),
            None => OnceCell::new(),
        };
        Appwrite {
            client: Client::new(
                &config.backend.endpoint,
                &config.backend.project_id,
                config.backend.api_key.as_deref(),
            ),
            database_id: config.backend.database_id.to_owned(),
            user_id,
        }
    }

    fn documents_path(&self, collection: &str) -> String {
        format!(
            "databases/{}/collections/{}/documents",
            self.database_id, collection
        )
    }

    /// Return the account behind the configured credentials.
    ///
    pub async fn account(&self) -> Result<Account, BackendError> {
        debug!("Requesting account details...");
        self.client.get::<Account>("account").await
    }
}

#[async_trait]
impl DocumentStore for Appwrite {
    async fn get_document(&self, collection: &str, id: &str) -> Result<Value, BackendError> {
        let path = format!("{}/{}", self.documents_path(collection), id);
        match self.client.get::<Value>(&path).await {
            Err(BackendError::Api { status: 404, .. }) => Err(BackendError::NotFound {
                id: id.to_owned(),
            }),
            other => other,
        }
    }

    async fn list_documents(
        &self,
        collection: &str,
        queries: &[Query],
    ) -> Result<Vec<Value>, BackendError> {
        self.client
            .list::<Value>(&self.documents_path(collection), queries)
            .await
    }

    async fn create_document(&self, collection: &str, data: Value) -> Result<Value, BackendError> {
        let body = json!({ "documentId": "unique()", "data": data });
        self.client
            .send(Method::POST, &self.documents_path(collection), body)
            .await
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        data: Value,
    ) -> Result<Value, BackendError> {
        let path = format!("{}/{}", self.documents_path(collection), id);
        self.client
            .send(Method::PATCH, &path, json!({ "data": data }))
            .await
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), BackendError> {
        let path = format!("{}/{}", self.documents_path(collection), id);
        self.client.delete(&path).await
    }
}

#[async_trait]
impl Session for Appwrite {
    async fn current_user_id(&self) -> Result<String, BackendError> {
        self.user_id
            .get_or_try_init(|| async { self.account().await.map(|account| account.id) })
            .await
            .map(|id| id.to_owned())
    }
}

/// Collection ids for each document type.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Collections {
    pub tasks: String,
    pub projects: String,
}

/// Responsible for typed task and project operations against a document
/// store, scoped to the signed-in user.
///
pub struct Backend<S> {
    store: S,
    collections: Collections,
}

impl Backend<Appwrite> {
    /// Returns a REST-backed instance for the given configuration.
    ///
    pub fn from_config(config: &Config) -> Self {
        Backend::new(
            Appwrite::new(config),
            Collections {
                tasks: config.backend.tasks_collection.to_owned(),
                projects: config.backend.projects_collection.to_owned(),
            },
        )
    }
}

impl<S: DocumentStore + Session> Backend<S> {
    pub fn new(store: S, collections: Collections) -> Self {
        Backend { store, collections }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn owned_by_user(&self, mut queries: Vec<Query>) -> Result<Vec<Query>, BackendError> {
        let user_id = self.store.current_user_id().await?;
        queries.insert(0, Query::equal("userId", user_id));
        Ok(queries)
    }

    async fn list<T: DeserializeOwned>(
        &self,
        collection: &str,
        queries: Vec<Query>,
    ) -> Result<Vec<T>, BackendError> {
        let queries = self.owned_by_user(queries).await?;
        self.store
            .list_documents(collection, &queries)
            .await?
            .into_iter()
            .map(|document| serde_json::from_value(document).map_err(BackendError::from))
            .collect()
    }

    /// Returns the tasks in a smart list.
    ///
    pub async fn smart_list_tasks(
        &self,
        list: SmartList,
        bounds: &DayBounds,
    ) -> Result<Vec<Task>, BackendError> {
        debug!("Requesting tasks for smart list {:?}...", list);
        let tasks: Vec<Task> = self.list(&self.collections.tasks, list.queries(bounds)).await?;
        debug!("Retrieved {} tasks for smart list {:?}", tasks.len(), list);
        Ok(tasks)
    }

    /// Returns every task of the signed-in user.
    ///
    pub async fn all_tasks(&self) -> Result<Vec<Task>, BackendError> {
        debug!("Requesting all tasks...");
        self.list(
            &self.collections.tasks,
            vec![Query::order_asc("due_date")],
        )
        .await
    }

    /// Returns the incomplete tasks of one project.
    ///
    pub async fn project_tasks(&self, project_id: &str) -> Result<Vec<Task>, BackendError> {
        debug!("Requesting tasks for project {}...", project_id);
        self.list(
            &self.collections.tasks,
            vec![
                Query::equal("projectId", project_id),
                Query::equal("completed", false),
                Query::order_asc("due_date"),
            ],
        )
        .await
    }

    /// Returns the projects of the signed-in user, newest first.
    ///
    pub async fn projects(&self) -> Result<Vec<Project>, BackendError> {
        debug!("Requesting projects...");
        let projects: Vec<Project> = self
            .list(
                &self.collections.projects,
                vec![Query::order_desc("$createdAt")],
            )
            .await?;
        debug!("Retrieved {} projects", projects.len());
        Ok(projects)
    }

    /// Create a task owned by the signed-in user.
    ///
    pub async fn create_task(&self, task: &NewTask) -> Result<Task, BackendError> {
        debug!("Creating task '{}'...", task.content);
        let user_id = self.store.current_user_id().await?;
        let mut data = serde_json::to_value(task)?;
        data["userId"] = Value::from(user_id);
        let document = self
            .store
            .create_document(&self.collections.tasks, data)
            .await?;
        Ok(serde_json::from_value(document)?)
    }

    /// Apply a partial update to a task.
    ///
    pub async fn update_task(&self, task_id: &str, patch: &TaskPatch) -> Result<Task, BackendError> {
        debug!("Updating task {}...", task_id);
        let document = self
            .store
            .update_document(&self.collections.tasks, task_id, serde_json::to_value(patch)?)
            .await?;
        Ok(serde_json::from_value(document)?)
    }

    /// Mark a task complete or incomplete.
    ///
    pub async fn set_task_completed(&self, task_id: &str, completed: bool) -> Result<Task, BackendError> {
        self.update_task(
            task_id,
            &TaskPatch {
                completed: Some(completed),
                ..TaskPatch::default()
            },
        )
        .await
    }

    /// Delete a task.
    ///
    pub async fn delete_task(&self, task_id: &str) -> Result<(), BackendError> {
        debug!("Deleting task {}...", task_id);
        self.store
            .delete_document(&self.collections.tasks, task_id)
            .await
    }

    /// Create a project together with its initial tasks.
    ///
    pub async fn create_project(
        &self,
        project: &NewProject,
        tasks: &[NewTask],
    ) -> Result<(Project, Vec<Task>), BackendError> {
        debug!("Creating project '{}' with {} tasks...", project.name, tasks.len());
        let user_id = self.store.current_user_id().await?;
        let mut data = serde_json::to_value(project)?;
        data["userId"] = Value::from(user_id);
        let document = self
            .store
            .create_document(&self.collections.projects, data)
            .await?;
        let created: Project = serde_json::from_value(document)?;

        let mut created_tasks = Vec::with_capacity(tasks.len());
        for task in tasks {
            let task = NewTask {
                project_id: Some(created.id.to_owned()),
                ..task.clone()
            };
            created_tasks.push(self.create_task(&task).await?);
        }
        Ok((created, created_tasks))
    }

    /// Delete a project. Its tasks are removed by the backend relationship.
    ///
    pub async fn delete_project(&self, project_id: &str) -> Result<(), BackendError> {
        debug!("Deleting project {}...", project_id);
        self.store
            .delete_document(&self.collections.projects, project_id)
            .await
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{collections, MemoryStore};
    use super::*;
    use crate::config::BackendConfig;
    use chrono::{TimeZone, Utc};
    use fake::{Fake, Faker};
    use httpmock::MockServer;
    use uuid::Uuid;

    fn appwrite(server: &MockServer, user_id: Option<&str>) -> Appwrite {
        let mut config = Config::new();
        config.backend = BackendConfig {
            endpoint: server.base_url(),
            project_id: "tasky".to_string(),
            api_key: Some("secret".to_string()),
            user_id: user_id.map(str::to_owned),
            ..BackendConfig::default()
        };
        Appwrite::new(&config)
    }

    #[tokio::test]
    async fn account_success() -> Result<(), BackendError> {
        let account: Account = Faker.fake();

        let server = MockServer::start();
        let mock = server
            .mock_async(|when, then| {
                when.method("GET")
                    .path("/account")
                    .header("X-Appwrite-Project", "tasky")
                    .header("X-Appwrite-Key", "secret");
                then.status(200).json_body(json!({
                    "$id": account.id,
                    "name": account.name,
                    "email": account.email,
                }));
            })
            .await;

        let store = appwrite(&server, None);
        assert_eq!(store.current_user_id().await?, account.id);
        // Cached after the first lookup.
        assert_eq!(store.current_user_id().await?, account.id);
        mock.assert_hits_async(1).await;
        Ok(())
    }

    #[tokio::test]
    async fn account_unauthorized() {
        let server = MockServer::start();
        let mock = server
            .mock_async(|when, then| {
                when.method("GET").path("/account");
                then.status(401).json_body(json!({
                    "message": "User (role: guests) missing scope (account)",
                    "code": 401,
                }));
            })
            .await;

        let store = appwrite(&server, None);
        let error = store.current_user_id().await.unwrap_err();
        assert!(error.is_unauthorized());
        assert!(error.to_string().contains("missing scope"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn configured_user_skips_account_lookup() -> Result<(), BackendError> {
        let server = MockServer::start();
        let store = appwrite(&server, Some("user-1"));
        assert_eq!(store.current_user_id().await?, "user-1");
        Ok(())
    }

    #[tokio::test]
    async fn list_documents_follows_pagination() -> Result<(), BackendError> {
        let server = MockServer::start();
        let first_page: Vec<Value> = (0..100)
            .map(|i| json!({ "$id": format!("t{}", i), "content": "task" }))
            .collect();
        let first = server
            .mock_async(|when, then| {
                when.method("GET")
                    .path("/databases/tasky/collections/tasks/documents")
                    .query_param("queries[]", r#"{"method":"offset","values":[0]}"#);
                then.status(200)
                    .json_body(json!({ "total": 101, "documents": first_page }));
            })
            .await;
        let second = server
            .mock_async(|when, then| {
                when.method("GET")
                    .path("/databases/tasky/collections/tasks/documents")
                    .query_param("queries[]", r#"{"method":"offset","values":[100]}"#);
                then.status(200).json_body(json!({
                    "total": 101,
                    "documents": [{ "$id": "t100", "content": "last" }],
                }));
            })
            .await;

        let store = appwrite(&server, Some("user-1"));
        let documents = store.list_documents("tasks", &[]).await?;
        assert_eq!(documents.len(), 101);
        first.assert_async().await;
        second.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn get_document_not_found() {
        let server = MockServer::start();
        let id = Uuid::new_v4().to_string();
        let mock = server
            .mock_async(|when, then| {
                when.method("GET")
                    .path(format!("/databases/tasky/collections/tasks/documents/{}", id));
                then.status(404)
                    .json_body(json!({ "message": "Document not found", "code": 404 }));
            })
            .await;

        let store = appwrite(&server, Some("user-1"));
        let error = store.get_document("tasks", &id).await.unwrap_err();
        assert!(matches!(error, BackendError::NotFound { .. }));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn create_document_wraps_data() -> Result<(), BackendError> {
        let server = MockServer::start();
        let mock = server
            .mock_async(|when, then| {
                when.method("POST")
                    .path("/databases/tasky/collections/tasks/documents")
                    .json_body(json!({
                        "documentId": "unique()",
                        "data": { "content": "Write report" },
                    }));
                then.status(201)
                    .json_body(json!({ "$id": "t1", "content": "Write report" }));
            })
            .await;

        let store = appwrite(&server, Some("user-1"));
        let created = store
            .create_document("tasks", json!({ "content": "Write report" }))
            .await?;
        assert_eq!(created["$id"], "t1");
        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn smart_list_queries_are_scoped_to_user() -> Result<(), BackendError> {
        let store = MemoryStore::new(Some("user-1"));
        store.insert("tasks", json!({ "$id": "t1", "content": "Inbox task" }));
        let backend = Backend::new(store, collections());
        let bounds = DayBounds::of(&Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());

        let tasks = backend.smart_list_tasks(SmartList::Inbox, &bounds).await?;
        assert_eq!(tasks.len(), 1);

        let queries = backend.store().queries.lock().unwrap();
        assert_eq!(queries[0][0], Query::equal("userId", "user-1"));
        assert!(queries[0].contains(&Query::is_null("projectId")));
        Ok(())
    }

    #[tokio::test]
    async fn list_requires_session() {
        let backend = Backend::new(MemoryStore::new(None), collections());
        let error = backend.projects().await.unwrap_err();
        assert!(matches!(error, BackendError::Unauthenticated));
    }

    #[tokio::test]
    async fn create_project_links_tasks() -> Result<(), BackendError> {
        let backend = Backend::new(MemoryStore::new(Some("user-1")), collections());
        let project: NewProject = Faker.fake();
        let tasks = vec![
            NewTask {
                content: "Outline".to_string(),
                due_date: None,
                completed: false,
                project_id: None,
            },
            NewTask {
                content: "Draft".to_string(),
                due_date: Some(Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap()),
                completed: false,
                project_id: None,
            },
        ];

        let (created, created_tasks) = backend.create_project(&project, &tasks).await?;
        assert_eq!(created.name, project.name);
        assert_eq!(created.user_id, "user-1");
        assert_eq!(created_tasks.len(), 2);
        assert!(created_tasks
            .iter()
            .all(|task| task.project_id() == Some(created.id.as_str())));
        Ok(())
    }

    #[tokio::test]
    async fn set_task_completed_patches_document() -> Result<(), BackendError> {
        let store = MemoryStore::new(Some("user-1"));
        store.insert(
            "tasks",
            json!({ "$id": "t1", "content": "Water plants", "completed": false }),
        );
        let backend = Backend::new(store, collections());

        let task = backend.set_task_completed("t1", true).await?;
        assert!(task.completed);
        assert_eq!(task.content, "Water plants");
        Ok(())
    }

    #[tokio::test]
    async fn delete_missing_task() {
        let backend = Backend::new(MemoryStore::new(Some("user-1")), collections());
        assert!(backend.delete_task("missing").await.is_err());
    }
}
