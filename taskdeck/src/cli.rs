//! Command-line presentation layer.
//!
//! Turns parsed [`Command`]s into calls on the session and task stores and
//! renders the results as plain text. Output goes to any [`Write`] so the
//! commands can be exercised in tests.

use std::io::Write;

use chrono::{DateTime, NaiveDate, Utc};
use taskdeck_model::task::{Task, TaskDraft, TaskId};

use crate::app::App;
use crate::config::ClientConfig;
use crate::session::Access;
use crate::storage::KeyValueBackend;
use crate::tasks::{TaskError, TaskStore};

/// Subcommands of the `taskdeck` binary.
#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start a session.
    Login {
        /// Display name.
        #[arg(long)]
        name: String,
        /// Employee id; the email becomes `<id>@<email_domain>`.
        #[arg(long)]
        id: String,
    },
    /// End the session.
    Logout,
    /// Show who is logged in.
    Whoami,
    /// Create a task.
    Add {
        /// Task name.
        name: String,
        /// Optional description.
        #[arg(long)]
        description: Option<String>,
        /// Due date, RFC 3339 or `YYYY-MM-DD`.
        #[arg(long)]
        due: Option<String>,
    },
    /// Change a task. Omitted options keep their current value.
    Edit {
        /// Task id or unique id prefix.
        id: String,
        /// New name.
        #[arg(long)]
        name: Option<String>,
        /// New description; an empty string clears it.
        #[arg(long)]
        description: Option<String>,
        /// New due date, RFC 3339 or `YYYY-MM-DD`.
        #[arg(long)]
        due: Option<String>,
    },
    /// Flip a task between pending and completed.
    Toggle {
        /// Task id or unique id prefix.
        id: String,
    },
    /// Delete a task permanently.
    Delete {
        /// Task id or unique id prefix.
        id: String,
    },
    /// List tasks, newest first.
    List {
        /// Only tasks whose name contains this text (case-insensitive).
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show completion statistics and the latest tasks.
    Stats,
}

/// Errors reported to the user by the CLI.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// The dashboard requires a session.
    #[error("not logged in; run `taskdeck login --name <NAME> --id <ID>`")]
    NotLoggedIn,

    /// The session has not been restored yet.
    #[error("session is still loading")]
    SessionLoading,

    /// Name or id missing at login.
    #[error("both --name and --id are required and cannot be blank")]
    InvalidLogin,

    /// No task matches the given id.
    #[error("no task matches id {0:?}")]
    UnknownTask(String),

    /// The id prefix matches several tasks.
    #[error("id prefix {0:?} matches more than one task")]
    AmbiguousTask(String),

    /// The due date could not be parsed.
    #[error("invalid date {0:?}: expected RFC 3339 or YYYY-MM-DD")]
    InvalidDate(String),

    /// The task store rejected the input.
    #[error(transparent)]
    Task(#[from] TaskError),

    /// Writing output failed.
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Runs one command against `app`, writing human-readable output to `out`.
///
/// Without a command, prints the session status and, when logged in, the
/// statistics.
///
/// # Errors
///
/// Returns [`CliError`] if the command is not allowed in the current
/// session, refers to an unknown task, has invalid input, or writing or
/// flushing the output fails.
pub fn run<B: KeyValueBackend>(
    app: &mut App<B>,
    command: Option<Command>,
    config: &ClientConfig,
    out: &mut impl Write,
) -> Result<(), CliError> {
    execute(app, command, config, out)?;
    out.flush()?;
    Ok(())
}

fn execute<B: KeyValueBackend>(
    app: &mut App<B>,
    command: Option<Command>,
    config: &ClientConfig,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let Some(command) = command else {
        whoami(app, out)?;
        if app.session().is_authenticated() {
            write_stats(dashboard(app)?, config, out)?;
        }
        return Ok(());
    };

    match command {
        Command::Login { name, id } => {
            let (name, id) = (name.trim(), id.trim());
            if name.is_empty() || id.is_empty() {
                return Err(CliError::InvalidLogin);
            }
            let email = config.email_for(id);
            let profile = app.session_mut().login(name, &email);
            writeln!(out, "Logged in as {} <{}>", profile.name, profile.email)?;
        }
        Command::Logout => {
            app.session_mut().logout();
            writeln!(out, "Logged out")?;
        }
        Command::Whoami => whoami(app, out)?,
        Command::Add {
            name,
            description,
            due,
        } => {
            let draft = TaskDraft {
                name,
                description,
                due_date: due.as_deref().map(parse_due).transpose()?,
            };
            let task = dashboard(app)?.create(draft)?;
            writeln!(out, "Created {}", task.id)?;
            write_task(&task, out)?;
        }
        Command::Edit {
            id,
            name,
            description,
            due,
        } => {
            let draft = TaskDraft {
                name: name.unwrap_or_default(),
                description,
                due_date: due.as_deref().map(parse_due).transpose()?,
            };
            let tasks = dashboard(app)?;
            let id = resolve_id(tasks, &id)?;
            if let Some(task) = tasks.update(&id, draft) {
                write_task(&task, out)?;
            }
        }
        Command::Toggle { id } => {
            let tasks = dashboard(app)?;
            let id = resolve_id(tasks, &id)?;
            if let Some(task) = tasks.toggle_completion(&id) {
                write_task(&task, out)?;
            }
        }
        Command::Delete { id } => {
            let tasks = dashboard(app)?;
            let id = resolve_id(tasks, &id)?;
            if let Some(task) = tasks.delete(&id) {
                writeln!(out, "Deleted {} {}", task.id, task.name)?;
            }
        }
        Command::List { search } => {
            let tasks = dashboard(app)?;
            let shown = tasks.search(search.as_deref().unwrap_or_default());
            if shown.is_empty() {
                writeln!(out, "No tasks found.")?;
            }
            for task in shown {
                write_task(task, out)?;
            }
        }
        Command::Stats => write_stats(dashboard(app)?, config, out)?,
    }
    Ok(())
}

/// The task store, or the reason it is not reachable.
fn dashboard<B: KeyValueBackend>(app: &mut App<B>) -> Result<&mut TaskStore<B>, CliError> {
    app.dashboard().map_err(|access| match access {
        Access::Loading => CliError::SessionLoading,
        Access::Allowed | Access::Redirect(_) => CliError::NotLoggedIn,
    })
}

fn whoami<B: KeyValueBackend>(app: &App<B>, out: &mut impl Write) -> Result<(), CliError> {
    let session = app.session();
    if !session.is_authenticated() {
        writeln!(out, "Not logged in")?;
        return Ok(());
    }
    match session.user() {
        Some(user) => writeln!(
            out,
            "[{}] {} <{}> {}",
            session.initials(),
            user.name,
            user.email,
            user.avatar_color
        )?,
        None => writeln!(out, "[{}] {}", session.initials(), session.display_name())?,
    }
    Ok(())
}

fn write_task(task: &Task, out: &mut impl Write) -> std::io::Result<()> {
    let mark = if task.is_completed() { 'x' } else { ' ' };
    write!(out, "[{mark}] {}  {}", task.id, task.name)?;
    if let Some(due) = task.due_date {
        write!(out, " (due {})", due.format("%Y-%m-%d"))?;
    }
    writeln!(out)?;
    if let Some(description) = &task.description {
        writeln!(out, "      {description}")?;
    }
    Ok(())
}

fn write_stats<B: KeyValueBackend>(
    tasks: &TaskStore<B>,
    config: &ClientConfig,
    out: &mut impl Write,
) -> std::io::Result<()> {
    let stats = tasks.stats();
    writeln!(
        out,
        "Tasks completed: {}/{} ({}%)",
        stats.completed, stats.total, stats.completion_rate
    )?;
    writeln!(out, "Pending: {}", stats.pending)?;

    let latest = tasks.latest(config.latest_count);
    if latest.is_empty() {
        writeln!(out, "No tasks yet.")?;
        return Ok(());
    }
    writeln!(out, "Latest created tasks:")?;
    for task in latest {
        let mark = if task.is_completed() { 'x' } else { ' ' };
        writeln!(out, "  [{mark}] {}", task.name_preview(config.name_preview_len))?;
    }
    Ok(())
}

/// Parses an RFC 3339 timestamp or a plain `YYYY-MM-DD` date (midnight UTC).
fn parse_due(raw: &str) -> Result<DateTime<Utc>, CliError> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|at| at.and_utc())
        .ok_or_else(|| CliError::InvalidDate(raw.to_string()))
}

/// Finds the task for an exact id, or else for a unique id prefix.
fn resolve_id<B: KeyValueBackend>(tasks: &TaskStore<B>, raw: &str) -> Result<TaskId, CliError> {
    let raw = raw.trim();
    let exact = TaskId::from(raw);
    if tasks.get(&exact).is_some() {
        return Ok(exact);
    }

    let mut matches = tasks
        .tasks()
        .iter()
        .filter(|t| !raw.is_empty() && t.id.as_str().starts_with(raw));
    match (matches.next(), matches.next()) {
        (Some(task), None) => Ok(task.id.clone()),
        (Some(_), Some(_)) => Err(CliError::AmbiguousTask(raw.to_string())),
        (None, _) => Err(CliError::UnknownTask(raw.to_string())),
    }
}
