use super::{
    counts, DayBounds, Focus, LoadTicket, ProjectFilter, ProjectSelection, PromptKind,
    RevealConfig, RevealController, SmartList, StateError, View,
};
use crate::app::NetworkEventSender;
use crate::backend::{Account, NewTask, Project, Task, TaskLike};
use crate::events::network::Event as NetworkEvent;
use crate::logger::LogBuffer;
use crate::ui::{Theme, SPINNER_FRAME_COUNT};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use log::*;
use ratatui::widgets::ListState;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Number of sidebar rows before the project rows.
///
const SMART_LIST_ROWS: usize = SmartList::ALL.len();

/// Parse a `YYYY-MM-DD` due date as local midnight.
///
pub fn parse_due_date(text: &str) -> Result<DateTime<Utc>, StateError> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(|naive| chrono::Local.from_local_datetime(&naive).earliest())
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| StateError::InvalidDueDate(text.to_owned()))
}

/// Houses data representative of application state.
///
pub struct State {
    net_sender: Option<NetworkEventSender>,
    account: Option<Account>,
    projects: Vec<Project>,
    tasks: Arc<[Task]>,
    loaded: bool,
    bounds: DayBounds,
    view: View,
    focus: Focus,
    sidebar_list_state: ListState,
    tasks_list_state: ListState,
    filter: ProjectFilter<Task>,
    reveal: RevealController<Task>,
    reveal_config: RevealConfig,
    revealed_at: Instant,
    prompt: Option<(PromptKind, String)>,
    status: Option<String>,
    show_log: bool,
    log_buffer: LogBuffer,
    spinner_index: usize,
    theme: Theme,
}

impl Default for State {
    fn default() -> State {
        let mut sidebar_list_state = ListState::default();
        sidebar_list_state.select(Some(0));
        let reveal_config = RevealConfig::default();
        State {
            net_sender: None,
            account: None,
            projects: vec![],
            tasks: Arc::from(Vec::new()),
            loaded: false,
            bounds: DayBounds::today(),
            view: View::default(),
            focus: Focus::Sidebar,
            sidebar_list_state,
            tasks_list_state: ListState::default(),
            filter: ProjectFilter::new(None),
            reveal: RevealController::new(Arc::from(Vec::new()), reveal_config),
            reveal_config,
            revealed_at: Instant::now(),
            prompt: None,
            status: None,
            show_log: false,
            log_buffer: LogBuffer::default(),
            spinner_index: 0,
            theme: Theme::default(),
        }
    }
}

impl State {
    /// Return new instance wired to the network thread.
    ///
    pub fn new(
        net_sender: NetworkEventSender,
        reveal_config: RevealConfig,
        log_buffer: LogBuffer,
        theme: Theme,
    ) -> Self {
        State {
            net_sender: Some(net_sender),
            reveal: RevealController::new(Arc::from(Vec::new()), reveal_config),
            reveal_config,
            log_buffer,
            theme,
            ..State::default()
        }
    }

    fn dispatch(&mut self, event: NetworkEvent) {
        match &self.net_sender {
            Some(sender) => {
                if sender.send(event).is_err() {
                    error!("{}", StateError::ChannelClosed);
                }
            }
            None => debug!("No network sender; dropping event {:?}", event),
        }
    }

    pub fn get_theme(&self) -> &Theme {
        &self.theme
    }

    pub fn get_account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    pub fn set_account(&mut self, account: Account) -> &mut Self {
        self.account = Some(account);
        self
    }

    /// Advance the spinner index.
    ///
    pub fn advance_spinner_index(&mut self) -> &mut Self {
        self.spinner_index = (self.spinner_index + 1) % SPINNER_FRAME_COUNT;
        self
    }

    pub fn get_spinner_index(&self) -> usize {
        self.spinner_index
    }

    pub fn current_focus(&self) -> Focus {
        self.focus
    }

    pub fn toggle_focus(&mut self) -> &mut Self {
        self.focus = match self.focus {
            Focus::Sidebar => Focus::Tasks,
            Focus::Tasks => Focus::Sidebar,
        };
        self
    }

    pub fn current_view(&self) -> &View {
        &self.view
    }

    /// Title of the current view, resolving project names.
    ///
    pub fn view_title(&self) -> String {
        match &self.view {
            View::Smart(list) => list.title().to_owned(),
            View::Project(id) => self
                .project_name(id)
                .unwrap_or("Unknown project")
                .to_owned(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn get_projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn set_projects(&mut self, projects: Vec<Project>) -> &mut Self {
        self.projects = projects;
        if let View::Project(id) = &self.view {
            if !self.projects.iter().any(|p| &p.id == id) {
                warn!("{}", StateError::ProjectNotFound { id: id.to_owned() });
                self.view = View::default();
                self.sidebar_list_state.select(Some(0));
                self.rebuild_view();
            }
        }
        self
    }

    pub fn project_name(&self, id: &str) -> Option<&str> {
        self.projects
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.name.as_str())
    }

    /// Project label for a task, preferring the embedded name.
    ///
    pub fn task_project_name<'a>(&'a self, task: &'a Task) -> Option<&'a str> {
        let project = task.project.as_ref()?;
        project.name().or_else(|| self.project_name(project.id()))
    }

    pub fn get_tasks(&self) -> &Arc<[Task]> {
        &self.tasks
    }

    /// Replace every task and re-derive the current view.
    ///
    pub fn set_tasks(&mut self, tasks: Vec<Task>) -> &mut Self {
        self.tasks = Arc::from(tasks);
        self.bounds = DayBounds::today();
        if self.loaded {
            self.refresh_view();
        } else {
            self.loaded = true;
            self.rebuild_view();
        }
        self
    }

    #[cfg(test)]
    fn set_bounds(&mut self, bounds: DayBounds) -> &mut Self {
        self.bounds = bounds;
        self.rebuild_view();
        self
    }

    /// Sidebar badge counts.
    ///
    pub fn smart_list_counts(&self) -> [(SmartList, usize); 4] {
        counts(&self.tasks, &self.bounds)
    }

    pub fn project_task_count(&self, project_id: &str) -> usize {
        self.tasks
            .iter()
            .filter(|task| !task.completed && task.project_id() == Some(project_id))
            .count()
    }

    /// The view's tasks before the project filter.
    ///
    fn view_tasks(&self) -> Vec<Task> {
        match &self.view {
            View::Smart(list) => list.select(&self.tasks, &self.bounds),
            View::Project(id) => {
                let selection = ProjectSelection::Project(id.to_owned());
                self.tasks
                    .iter()
                    .filter(|task| !task.completed && selection.matches(*task))
                    .cloned()
                    .collect()
            }
        }
    }

    /// Re-run the view through the project filter and restart the reveal.
    ///
    fn rebuild_view(&mut self) {
        self.filter.set_tasks(Some(Arc::from(self.view_tasks())));
        self.restart_reveal();
    }

    /// Re-run the view through the project filter, keeping the revealed
    /// pages and the cursor.
    ///
    fn refresh_view(&mut self) {
        self.filter.set_tasks(Some(Arc::from(self.view_tasks())));
        self.reveal.set_items(self.filter.filtered_tasks());
        let len = self.reveal.visible_items().len();
        let selected = match self.tasks_list_state.selected() {
            _ if len == 0 => None,
            Some(i) => Some(i.min(len - 1)),
            None => Some(0),
        };
        self.tasks_list_state.select(selected);
    }

    fn restart_reveal(&mut self) {
        self.reveal = RevealController::new(self.filter.filtered_tasks(), self.reveal_config);
        self.revealed_at = Instant::now();
        let selected = if self.reveal.visible_items().is_empty() {
            None
        } else {
            Some(0)
        };
        self.tasks_list_state.select(selected);
    }

    pub fn get_filter(&self) -> &ProjectFilter<Task> {
        &self.filter
    }

    pub fn get_reveal(&self) -> &RevealController<Task> {
        &self.reveal
    }

    /// Cycle the project filter: all, inbox, then each project.
    ///
    pub fn next_project_filter(&mut self) -> &mut Self {
        let next = match self.filter.selection() {
            ProjectSelection::All => ProjectSelection::Inbox,
            ProjectSelection::Inbox => self
                .projects
                .first()
                .map(|p| ProjectSelection::Project(p.id.to_owned()))
                .unwrap_or(ProjectSelection::All),
            ProjectSelection::Project(id) => {
                let position = self.projects.iter().position(|p| &p.id == id);
                position
                    .and_then(|i| self.projects.get(i + 1))
                    .map(|p| ProjectSelection::Project(p.id.to_owned()))
                    .unwrap_or(ProjectSelection::All)
            }
        };
        self.filter.set_selection(next);
        self.restart_reveal();
        self
    }

    pub fn filter_label(&self) -> String {
        match self.filter.selection() {
            ProjectSelection::Project(id) => self.project_name(id).unwrap_or(id).to_owned(),
            selection => selection.to_string(),
        }
    }

    /// Ask for the next page of the task list, unless one is already on its
    /// way or everything is shown.
    ///
    pub fn load_more(&mut self) -> &mut Self {
        if !self.reveal.has_more() || self.reveal.is_loading() {
            return self;
        }
        let ticket = self.reveal.handle_load_more();
        self.dispatch(NetworkEvent::RevealMore { ticket });
        self
    }

    pub fn complete_reveal(&mut self, ticket: LoadTicket) -> &mut Self {
        if self.reveal.complete_load(ticket) {
            self.revealed_at = Instant::now();
        } else {
            debug!("Ignoring stale reveal completion.");
        }
        self
    }

    /// Time since the latest page was revealed, for staggering its entrance.
    ///
    pub fn reveal_elapsed(&self) -> Duration {
        self.revealed_at.elapsed()
    }

    pub fn sidebar_len(&self) -> usize {
        SMART_LIST_ROWS + self.projects.len()
    }

    pub fn get_sidebar_list_state(&mut self) -> &mut ListState {
        &mut self.sidebar_list_state
    }

    pub fn next_sidebar_index(&mut self) -> &mut Self {
        let len = self.sidebar_len();
        let next = self
            .sidebar_list_state
            .selected()
            .map(|i| (i + 1) % len)
            .unwrap_or(0);
        self.sidebar_list_state.select(Some(next));
        self
    }

    pub fn previous_sidebar_index(&mut self) -> &mut Self {
        let len = self.sidebar_len();
        let previous = match self.sidebar_list_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.sidebar_list_state.select(Some(previous));
        self
    }

    /// Open the view under the sidebar cursor.
    ///
    pub fn select_sidebar_item(&mut self) -> &mut Self {
        let index = self.sidebar_list_state.selected().unwrap_or(0);
        let view = match SmartList::ALL.get(index) {
            Some(list) => View::Smart(*list),
            None => match self.projects.get(index - SMART_LIST_ROWS) {
                Some(project) => View::Project(project.id.to_owned()),
                None => return self,
            },
        };
        debug!("Switching to view {:?}", view);
        self.view = view;
        self.filter.set_selection(ProjectSelection::All);
        self.rebuild_view();
        self.focus = Focus::Tasks;
        self
    }

    pub fn get_tasks_list_state(&mut self) -> &mut ListState {
        &mut self.tasks_list_state
    }

    pub fn next_task_index(&mut self) -> &mut Self {
        let len = self.reveal.visible_items().len();
        if len == 0 {
            return self;
        }
        let next = match self.tasks_list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            Some(_) if self.reveal.has_more() => {
                self.load_more();
                len - 1
            }
            Some(_) => len - 1,
            None => 0,
        };
        self.tasks_list_state.select(Some(next));
        self
    }

    pub fn previous_task_index(&mut self) -> &mut Self {
        if self.reveal.visible_items().is_empty() {
            return self;
        }
        let previous = self
            .tasks_list_state
            .selected()
            .map(|i| i.saturating_sub(1))
            .unwrap_or(0);
        self.tasks_list_state.select(Some(previous));
        self
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.tasks_list_state
            .selected()
            .and_then(|i| self.reveal.visible_items().get(i))
    }

    pub fn toggle_selected_task(&mut self) -> Result<(), StateError> {
        let task = self.selected_task().ok_or(StateError::NoTaskSelected)?;
        let event = NetworkEvent::SetTaskCompleted {
            id: task.id.to_owned(),
            completed: !task.completed,
        };
        self.dispatch(event);
        Ok(())
    }

    pub fn delete_selected_task(&mut self) -> Result<(), StateError> {
        let task = self.selected_task().ok_or(StateError::NoTaskSelected)?;
        let event = NetworkEvent::DeleteTask {
            id: task.id.to_owned(),
        };
        self.dispatch(event);
        Ok(())
    }

    /// Project a new task lands in, given the current view and filter.
    ///
    fn target_project(&self) -> Option<String> {
        match (&self.view, self.filter.selection()) {
            (View::Project(id), _) => Some(id.to_owned()),
            (_, ProjectSelection::Project(id)) => Some(id.to_owned()),
            _ => None,
        }
    }

    pub fn get_prompt(&self) -> Option<&(PromptKind, String)> {
        self.prompt.as_ref()
    }

    pub fn is_prompt_open(&self) -> bool {
        self.prompt.is_some()
    }

    pub fn open_prompt(&mut self, kind: PromptKind) -> &mut Self {
        self.prompt = Some((kind, String::new()));
        self
    }

    pub fn close_prompt(&mut self) -> &mut Self {
        self.prompt = None;
        self
    }

    pub fn add_prompt_char(&mut self, c: char) -> &mut Self {
        if let Some((_, text)) = &mut self.prompt {
            text.push(c);
        }
        self
    }

    pub fn remove_prompt_char(&mut self) -> &mut Self {
        if let Some((_, text)) = &mut self.prompt {
            text.pop();
        }
        self
    }

    /// Act on the prompt text. Leaves the prompt open on error.
    ///
    pub fn submit_prompt(&mut self) -> Result<(), StateError> {
        let Some((kind, text)) = self.prompt.take() else {
            return Ok(());
        };
        let outcome = match &kind {
            PromptKind::AddTask => self.submit_task(&text),
            PromptKind::ProjectName if text.trim().is_empty() => Err(StateError::EmptyContent),
            PromptKind::ProjectName => {
                self.prompt = Some((
                    PromptKind::ProjectPrompt {
                        name: text.trim().to_owned(),
                    },
                    String::new(),
                ));
                return Ok(());
            }
            PromptKind::ProjectPrompt { name } => {
                self.dispatch(NetworkEvent::CreateProject {
                    name: name.to_owned(),
                    prompt: text.trim().to_owned(),
                });
                Ok(())
            }
        };
        if outcome.is_err() {
            self.prompt = Some((kind, text));
        }
        outcome
    }

    fn submit_task(&mut self, text: &str) -> Result<(), StateError> {
        let (content, due_date) = match text.rsplit_once(" @") {
            Some((content, due)) => (content, Some(parse_due_date(due)?)),
            None => (text, None),
        };
        let content = content.trim();
        if content.is_empty() {
            return Err(StateError::EmptyContent);
        }
        let due_date = match (&self.view, due_date) {
            (_, Some(due)) => Some(due),
            (View::Smart(SmartList::Today), None) => Some(self.bounds.start),
            _ => None,
        };
        let task = NewTask {
            content: content.to_owned(),
            due_date,
            completed: false,
            project_id: self.target_project(),
        };
        self.dispatch(NetworkEvent::CreateTask { task });
        Ok(())
    }

    pub fn get_status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, status: Option<String>) -> &mut Self {
        self.status = status;
        self
    }

    pub fn is_log_visible(&self) -> bool {
        self.show_log
    }

    pub fn toggle_log(&mut self) -> &mut Self {
        self.show_log = !self.show_log;
        self
    }

    pub fn get_log_entries(&self) -> Vec<String> {
        self.log_buffer.entries()
    }

    pub fn refresh(&mut self) -> &mut Self {
        self.dispatch(NetworkEvent::RefreshTasks);
        self
    }
}
