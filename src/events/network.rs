use crate::ai::{self, TextGenerator};
use crate::backend::{Backend, DocumentStore, NewProject, NewTask, Session};
use crate::state::{Delay, LoadTicket, State};
use anyhow::Result;
use log::*;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Colors handed out to new projects, by name and hex value.
///
const PROJECT_COLORS: [(&str, &str); 6] = [
    ("slate", "#64748b"),
    ("red", "#ef4444"),
    ("amber", "#f59e0b"),
    ("green", "#22c55e"),
    ("sky", "#0ea5e9"),
    ("violet", "#8b5cf6"),
];

/// Specify different network event types.
///
#[derive(Debug)]
pub enum Event {
    Bootstrap,
    RefreshTasks,
    CreateTask {
        task: NewTask,
    },
    SetTaskCompleted {
        id: String,
        completed: bool,
    },
    DeleteTask {
        id: String,
    },
    CreateProject {
        name: String,
        prompt: String,
    },
    RevealMore {
        ticket: LoadTicket,
    },
}

/// Specify struct for managing state with network events.
///
pub struct Handler<'a, S, G: ?Sized> {
    state: &'a Arc<Mutex<State>>,
    backend: &'a Backend<S>,
    generator: Option<&'a G>,
    delay: Arc<dyn Delay>,
}

impl<'a, S, G> Handler<'a, S, G>
where
    S: DocumentStore + Session,
    G: TextGenerator + ?Sized,
{
    /// Return new instance with reference to state.
    ///
    pub fn new(
        state: &'a Arc<Mutex<State>>,
        backend: &'a Backend<S>,
        generator: Option<&'a G>,
        delay: Arc<dyn Delay>,
    ) -> Self {
        Handler {
            state,
            backend,
            generator,
            delay,
        }
    }

    /// Handle network events by type. Failures are also reported on the
    /// status line.
    ///
    pub async fn handle(&mut self, event: Event) -> Result<()> {
        debug!("Processing network event '{:?}'...", event);
        let result = match event {
            Event::Bootstrap => self.bootstrap().await,
            Event::RefreshTasks => self.refresh_tasks().await,
            Event::CreateTask { task } => self.create_task(task).await,
            Event::SetTaskCompleted { id, completed } => self.set_task_completed(id, completed).await,
            Event::DeleteTask { id } => self.delete_task(id).await,
            Event::CreateProject { name, prompt } => self.create_project(name, prompt).await,
            Event::RevealMore { ticket } => {
                self.reveal_more(ticket).await;
                Ok(())
            }
        };
        if let Err(e) = &result {
            self.state.lock().await.set_status(Some(e.to_string()));
        }
        result
    }

    /// Load the account, projects and tasks.
    ///
    async fn bootstrap(&mut self) -> Result<()> {
        info!("Preparing initial application data...");
        let user_id = self.backend.store().current_user_id().await?;
        info!("Signed in as user {}.", user_id);
        let projects = self.backend.projects().await?;
        self.state.lock().await.set_projects(projects);
        self.refresh_tasks().await?;
        info!("Loaded initial application data.");
        Ok(())
    }

    /// Replace every task in state with the backend's.
    ///
    async fn refresh_tasks(&mut self) -> Result<()> {
        let tasks = self.backend.all_tasks().await?;
        info!("Received {} tasks.", tasks.len());
        let mut state = self.state.lock().await;
        state.set_tasks(tasks);
        state.set_status(None);
        Ok(())
    }

    async fn create_task(&mut self, task: NewTask) -> Result<()> {
        let created = self.backend.create_task(&task).await?;
        info!("Created task '{}'.", created.content);
        self.refresh_tasks().await
    }

    async fn set_task_completed(&mut self, id: String, completed: bool) -> Result<()> {
        let task = self.backend.set_task_completed(&id, completed).await?;
        info!(
            "Marked task '{}' as {}.",
            task.content,
            if completed { "complete" } else { "incomplete" }
        );
        self.refresh_tasks().await
    }

    async fn delete_task(&mut self, id: String) -> Result<()> {
        self.backend.delete_task(&id).await?;
        info!("Deleted task {}.", id);
        self.refresh_tasks().await
    }

    /// Create a project, generating its tasks from the prompt when one is
    /// given and a generator is configured.
    ///
    async fn create_project(&mut self, name: String, prompt: String) -> Result<()> {
        let tasks = match (prompt.trim().is_empty(), self.generator) {
            (true, _) => vec![],
            (false, Some(generator)) => {
                ai::generate_project_tasks(generator, &prompt, chrono::Utc::now()).await?
            }
            (false, None) => {
                warn!("No generative-language API key configured; creating an empty project.");
                vec![]
            }
        };
        let project_count = self.state.lock().await.get_projects().len();
        let (color_name, color_hex) = PROJECT_COLORS[project_count % PROJECT_COLORS.len()];
        let project = NewProject {
            name,
            color_name: color_name.to_owned(),
            color_hex: color_hex.to_owned(),
        };
        let (created, created_tasks) = self.backend.create_project(&project, &tasks).await?;
        info!(
            "Created project '{}' with {} tasks.",
            created.name,
            created_tasks.len()
        );
        let projects = self.backend.projects().await?;
        self.state.lock().await.set_projects(projects);
        self.refresh_tasks().await
    }

    /// Complete a reveal step once the delay has passed, without holding up
    /// other events.
    ///
    async fn reveal_more(&mut self, ticket: LoadTicket) {
        let load_delay = self.state.lock().await.get_reveal().config().load_delay;
        let wait = self.delay.wait(load_delay);
        let state = Arc::clone(self.state);
        tokio::spawn(async move {
            wait.await;
            state.lock().await.complete_reveal(ticket);
        });
    }
}
