//! Non-interactive commands.
//!
//! Every subcommand other than `ui` talks to the backend directly and prints
//! its result to stdout.

use crate::ai::{self, TextGenerator};
use crate::backend::{Backend, DocumentStore, NewProject, NewTask, Session, Task};
use crate::config::Config;
use crate::error::AppError;
use crate::state::{
    parse_due_date, DayBounds, NoDelay, ProjectFilter, RevealConfig, RevealController,
    SmartList,
};
use anyhow::Result;
use chrono::{Local, Utc};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use log::*;
use std::io::Write;
use std::sync::Arc;

/// Color given to projects created from the command line.
///
const DEFAULT_PROJECT_COLOR: (&str, &str) = ("slate", "#64748b");

/// Build the command-line definition.
///
pub fn app() -> App<'static, 'static> {
    App::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .setting(AppSettings::VersionlessSubcommands)
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .help("Specify configuration directory")
                .takes_value(true)
                .global(true),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Log debug output")
                .global(true),
        )
        .subcommand(
            SubCommand::with_name("login")
                .about("Store backend credentials")
                .arg(
                    Arg::with_name("project")
                        .long("project")
                        .takes_value(true)
                        .required(true)
                        .help("Backend project id"),
                )
                .arg(
                    Arg::with_name("key")
                        .long("key")
                        .takes_value(true)
                        .required(true)
                        .help("Backend API key"),
                )
                .arg(
                    Arg::with_name("endpoint")
                        .long("endpoint")
                        .takes_value(true)
                        .help("Backend endpoint URL"),
                )
                .arg(
                    Arg::with_name("user")
                        .long("user")
                        .takes_value(true)
                        .help("User id owning the tasks"),
                ),
        )
        .subcommand(SubCommand::with_name("projects").about("List projects"))
        .subcommand(
            SubCommand::with_name("tasks")
                .about("List tasks")
                .arg(
                    Arg::with_name("list")
                        .long("list")
                        .takes_value(true)
                        .possible_values(&["today", "upcoming", "inbox", "completed"])
                        .help("Smart list to show"),
                )
                .arg(
                    Arg::with_name("project")
                        .long("project")
                        .takes_value(true)
                        .help("Project id, or 'inbox'"),
                )
                .arg(
                    Arg::with_name("pages")
                        .long("pages")
                        .takes_value(true)
                        .default_value("0")
                        .help("Extra pages to reveal"),
                ),
        )
        .subcommand(
            SubCommand::with_name("add")
                .about("Add a task")
                .arg(Arg::with_name("content").required(true).help("Task content"))
                .arg(
                    Arg::with_name("due")
                        .long("due")
                        .takes_value(true)
                        .help("Due date as YYYY-MM-DD"),
                )
                .arg(
                    Arg::with_name("project")
                        .long("project")
                        .takes_value(true)
                        .help("Project id"),
                ),
        )
        .subcommand(
            SubCommand::with_name("complete")
                .about("Mark a task as complete")
                .arg(Arg::with_name("id").required(true))
                .arg(
                    Arg::with_name("undo")
                        .long("undo")
                        .help("Mark as incomplete instead"),
                ),
        )
        .subcommand(
            SubCommand::with_name("delete")
                .about("Delete a task")
                .arg(Arg::with_name("id").required(true)),
        )
        .subcommand(
            SubCommand::with_name("delete-project")
                .about("Delete a project")
                .arg(Arg::with_name("id").required(true)),
        )
        .subcommand(
            SubCommand::with_name("generate")
                .about("Create a project with AI-generated tasks")
                .arg(Arg::with_name("name").required(true))
                .arg(Arg::with_name("prompt").required(true)),
        )
        .subcommand(SubCommand::with_name("ui").about("Start the terminal interface (default)"))
}

/// Options for listing tasks.
///
#[derive(Debug, Default, PartialEq)]
pub struct TaskListOptions {
    pub list: Option<SmartList>,
    pub project: Option<String>,
    pub pages: usize,
}

impl TaskListOptions {
    fn from_matches(matches: &ArgMatches) -> Result<Self, AppError> {
        let pages = matches
            .value_of("pages")
            .unwrap_or("0")
            .parse()
            .map_err(|_| AppError::Usage("--pages expects a number".to_string()))?;
        Ok(TaskListOptions {
            list: matches.value_of("list").and_then(SmartList::parse),
            project: matches.value_of("project").map(str::to_owned),
            pages,
        })
    }
}

/// Run a non-interactive subcommand.
///
pub async fn run(config: &mut Config, name: &str, matches: &ArgMatches<'_>) -> Result<()> {
    if name == "login" {
        return login(config, matches).await;
    }
    if !config.is_signed_in() {
        return Err(AppError::Usage("Not signed in; run `tasky login` first".to_string()).into());
    }

    let backend = Backend::from_config(config);
    let mut out = std::io::stdout();
    match name {
        "projects" => print_projects(&backend, &mut out).await?,
        "tasks" => {
            let options = TaskListOptions::from_matches(matches)?;
            print_tasks(&backend, &options, config.reveal.to_reveal_config(), &mut out).await?
        }
        "add" => {
            let task = NewTask {
                content: matches.value_of("content").unwrap_or_default().to_owned(),
                due_date: matches.value_of("due").map(parse_due_date).transpose()?,
                completed: false,
                project_id: matches.value_of("project").map(str::to_owned),
            };
            add_task(&backend, &task, &mut out).await?
        }
        "complete" => {
            let id = matches.value_of("id").unwrap_or_default();
            let task = backend
                .set_task_completed(id, !matches.is_present("undo"))
                .await?;
            writeln!(out, "{}", task_line(&task))?;
        }
        "delete" => {
            let id = matches.value_of("id").unwrap_or_default();
            backend.delete_task(id).await?;
            writeln!(out, "Deleted task {}", id)?;
        }
        "delete-project" => {
            let id = matches.value_of("id").unwrap_or_default();
            backend.delete_project(id).await?;
            writeln!(out, "Deleted project {}", id)?;
        }
        "generate" => {
            let generator = ai::Gemini::new(&config.ai)?;
            generate_project(
                &backend,
                &generator,
                matches.value_of("name").unwrap_or_default(),
                matches.value_of("prompt").unwrap_or_default(),
                &mut out,
            )
            .await?
        }
        other => return Err(AppError::Usage(format!("Unknown command '{}'", other)).into()),
    }
    Ok(())
}

/// Store the credentials, then confirm them by fetching the account.
///
async fn login(config: &mut Config, matches: &ArgMatches<'_>) -> Result<()> {
    let project_id = matches.value_of("project").unwrap_or_default();
    let api_key = matches.value_of("key").unwrap_or_default();
    let endpoint = matches.value_of("endpoint");
    let user_id = matches.value_of("user");
    config.save_credentials(endpoint, project_id, api_key, user_id)?;
    info!("Saved credentials to {:?}", config.file_path());

    let backend = Backend::from_config(config);
    match backend.store().account().await {
        Ok(account) => {
            println!("Signed in as {} <{}>", account.name, account.email);
            if user_id.is_none() {
                config.save_credentials(endpoint, project_id, api_key, Some(&account.id))?;
            }
        }
        Err(e) if e.is_unauthorized() => {
            warn!("{}", e);
            println!("Credentials saved; the account could not be read with this key.");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// One printable line per task.
///
pub fn task_line(task: &Task) -> String {
    let mut line = format!(
        "{} {}  {}",
        if task.completed { "[x]" } else { "[ ]" },
        task.id,
        task.content
    );
    if let Some(due) = task.due_date {
        line.push_str(&format!("  (due {})", due.with_timezone(&Local).format("%Y-%m-%d")));
    }
    line
}

pub async fn print_projects<S, W>(backend: &Backend<S>, out: &mut W) -> Result<()>
where
    S: DocumentStore + Session,
    W: Write,
{
    let projects = backend.projects().await?;
    if projects.is_empty() {
        writeln!(out, "No projects.")?;
    }
    for project in projects {
        writeln!(out, "{}  {} ({})", project.id, project.name, project.color_name)?;
    }
    Ok(())
}

/// Print the tasks of a smart list (or every open task), narrowed by the
/// project filter and revealed page by page.
///
pub async fn print_tasks<S, W>(
    backend: &Backend<S>,
    options: &TaskListOptions,
    reveal_config: RevealConfig,
    out: &mut W,
) -> Result<()>
where
    S: DocumentStore + Session,
    W: Write,
{
    let bounds = DayBounds::today();
    let tasks = match options.list {
        Some(list) => list.select(&backend.smart_list_tasks(list, &bounds).await?, &bounds),
        None => backend
            .all_tasks()
            .await?
            .into_iter()
            .filter(|task| !task.completed)
            .collect(),
    };

    let mut filter = ProjectFilter::new(Some(Arc::from(tasks)));
    filter.set_selected_project_id(options.project.as_deref());
    let mut reveal = RevealController::new(filter.filtered_tasks(), reveal_config);
    for _ in 0..options.pages {
        if !reveal.has_more() {
            break;
        }
        reveal.load_more(&NoDelay).await;
    }

    if reveal.items().is_empty() {
        writeln!(out, "No tasks.")?;
    }
    for task in reveal.visible_items() {
        writeln!(out, "{}", task_line(task))?;
    }
    if reveal.has_more() {
        writeln!(
            out,
            "... {} more (use --pages to show more)",
            reveal.items().len() - reveal.visible_count()
        )?;
    }
    Ok(())
}

pub async fn add_task<S, W>(backend: &Backend<S>, task: &NewTask, out: &mut W) -> Result<()>
where
    S: DocumentStore + Session,
    W: Write,
{
    if task.content.trim().is_empty() {
        return Err(AppError::Usage("Task content cannot be empty".to_string()).into());
    }
    let created = backend.create_task(task).await?;
    writeln!(out, "{}", task_line(&created))?;
    Ok(())
}

pub async fn generate_project<S, G, W>(
    backend: &Backend<S>,
    generator: &G,
    name: &str,
    prompt: &str,
    out: &mut W,
) -> Result<()>
where
    S: DocumentStore + Session,
    G: TextGenerator + ?Sized,
    W: Write,
{
    let tasks = ai::generate_project_tasks(generator, prompt, Utc::now()).await?;
    let (color_name, color_hex) = DEFAULT_PROJECT_COLOR;
    let project = NewProject {
        name: name.to_owned(),
        color_name: color_name.to_owned(),
        color_hex: color_hex.to_owned(),
    };
    let (created, tasks) = backend.create_project(&project, &tasks).await?;
    writeln!(out, "Created project {} ({})", created.name, created.id)?;
    for task in &tasks {
        writeln!(out, "  {}", task_line(task))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::testing::CannedGenerator;
    use crate::backend::testing::{collections, MemoryStore};
    use serde_json::json;

    fn backend(open_tasks: usize) -> Backend<MemoryStore> {
        let store = MemoryStore::new(Some("user-1"));
        store.insert(
            "projects",
            json!({ "$id": "p1", "name": "Garden", "color_name": "green", "userId": "user-1" }),
        );
        for i in 0..open_tasks {
            let project = if i % 2 == 0 { json!("p1") } else { json!(null) };
            store.insert(
                "tasks",
                json!({ "$id": format!("t{}", i), "content": format!("Task {}", i), "projectId": project, "userId": "user-1" }),
            );
        }
        store.insert(
            "tasks",
            json!({ "$id": "done", "content": "Done already", "completed": true, "userId": "user-1" }),
        );
        Backend::new(store, collections())
    }

    fn output(buffer: Vec<u8>) -> String {
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn parses_task_options() {
        let matches = app().get_matches_from(vec![
            "tasky", "tasks", "--list", "inbox", "--project", "p1", "--pages", "2",
        ]);
        let (name, sub) = matches.subcommand();
        assert_eq!(name, "tasks");
        let options = TaskListOptions::from_matches(sub.unwrap()).unwrap();
        assert_eq!(
            options,
            TaskListOptions {
                list: Some(SmartList::Inbox),
                project: Some("p1".to_string()),
                pages: 2,
            }
        );
    }

    #[test]
    fn global_config_flag() {
        let matches = app().get_matches_from(vec!["tasky", "--config", "/tmp/tasky", "projects"]);
        assert_eq!(matches.value_of("config"), Some("/tmp/tasky"));
        assert_eq!(matches.subcommand_name(), Some("projects"));
    }

    #[test]
    fn task_line_marks_completion() {
        let task = Task {
            id: "t1".to_string(),
            content: "Water plants".to_string(),
            due_date: None,
            completed: true,
            project: None,
            user_id: "user-1".to_string(),
            created_at: None,
            updated_at: None,
        };
        assert_eq!(task_line(&task), "[x] t1  Water plants");
    }

    #[tokio::test]
    async fn print_tasks_reveals_pages() -> Result<()> {
        let backend = backend(5);
        let config = RevealConfig::with_counts(Some(2), Some(2));

        let mut out = vec![];
        print_tasks(&backend, &TaskListOptions::default(), config, &mut out).await?;
        let text = output(out);
        assert!(text.contains("Task 0"));
        assert!(text.contains("Task 1"));
        assert!(!text.contains("Task 2"));
        assert!(!text.contains("Done already"));
        assert!(text.contains("3 more"));

        let mut out = vec![];
        let options = TaskListOptions {
            pages: 5,
            ..Default::default()
        };
        print_tasks(&backend, &options, config, &mut out).await?;
        let text = output(out);
        assert!(text.contains("Task 4"));
        assert!(!text.contains("more"));
        Ok(())
    }

    #[tokio::test]
    async fn print_tasks_applies_project_filter() -> Result<()> {
        let backend = backend(4);
        let options = TaskListOptions {
            project: Some("inbox".to_string()),
            ..Default::default()
        };
        let mut out = vec![];
        print_tasks(&backend, &options, RevealConfig::default(), &mut out).await?;
        let text = output(out);
        assert!(text.contains("Task 1"));
        assert!(text.contains("Task 3"));
        assert!(!text.contains("Task 0"));
        Ok(())
    }

    #[tokio::test]
    async fn print_projects_lists_names() -> Result<()> {
        let mut out = vec![];
        print_projects(&backend(0), &mut out).await?;
        assert_eq!(output(out), "p1  Garden (green)\n");
        Ok(())
    }

    #[tokio::test]
    async fn add_task_rejects_blank_content() {
        let task = NewTask {
            content: "  ".to_string(),
            due_date: None,
            completed: false,
            project_id: None,
        };
        let mut out = vec![];
        assert!(add_task(&backend(0), &task, &mut out).await.is_err());
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn generate_project_creates_tasks() -> Result<()> {
        let backend = backend(0);
        let generator = CannedGenerator::new(r#"[{"content":"Buy seeds","due_date":null}]"#);
        let mut out = vec![];
        generate_project(&backend, &generator, "Veggies", "Grow vegetables", &mut out).await?;
        let text = output(out);
        assert!(text.contains("Created project Veggies"));
        assert!(text.contains("Buy seeds"));
        Ok(())
    }
}
