//! `cmdtree-todo`: a small task list manager built on `cmdtree-core`.
//!
//! ```text
//! todo [--verbose] [--version]
//! ├── list --file <path> [--tags a,b]
//! │   ├── today
//! │   └── overdue
//! └── task --file <path>
//!     ├── add [--tags a,b] <text>
//!     ├── done <id>
//!     └── remove [--force] [--all] <id>
//! ```
//!
//! Flags may be given anywhere on the command line. Set `CMDTREE_CONFIG` to a
//! YAML file to change help wrapping, help tokens or suggestion tuning, and
//! `RUST_LOG` to see resolution logs on stderr.

mod store;

use std::io::{BufRead, BufReader, Write};

use chrono::Utc;
use cmdtree_core::{
    Command, Config, FlagOption, HandlerResult, Resolver, RunContext, RunOptions, State,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::store::{Task, TaskList};

const CONFIG_ENV: &str = "CMDTREE_CONFIG";

fn main() {
    init_tracing();

    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
}

fn run() -> cmdtree_core::Result<()> {
    let config = match std::env::var_os(CONFIG_ENV) {
        Some(path) => {
            debug!(path = ?path, "Loading configuration");
            Config::load(path)?
        }
        None => Config::default(),
    };

    let root = build_tree();
    let args: Vec<String> = std::env::args().skip(1).collect();
    Resolver::new(config).parse_and_run(&RunContext::new(), &root, &args, RunOptions::default())
}

fn build_tree() -> Command {
    Command::new("todo")
        .with_usage("todo <command> [flags]")
        .with_short_help("A simple CLI for managing your tasks")
        .with_flags(|f| {
            f.bool("verbose", false, "enable verbose output")
                .bool("version", false, "print the version");
        })
        .with_option(FlagOption::new("verbose").short('v'))
        .with_option(FlagOption::new("version").local())
        .with_handler(root_cmd)
        .with_subcommand(list_cmd())
        .with_subcommand(task_cmd())
}

fn list_cmd() -> Command {
    Command::new("list")
        .with_usage("todo list <command> [flags]")
        .with_short_help("List tasks")
        .with_flags(|f| {
            f.string("file", "", "path to the tasks file")
                .string("tags", "", "only show tasks with one of these comma-separated tags");
        })
        .with_option(FlagOption::new("file").required().short('f'))
        .with_handler(|_, state| {
            writeln!(
                state.stderr,
                "todo list: subcommand required, use --help for more information"
            )?;
            Ok(())
        })
        .with_subcommand(
            Command::new("today")
                .with_usage("todo list today [flags]")
                .with_short_help("List pending tasks created today")
                .with_handler(list_today),
        )
        .with_subcommand(
            Command::new("overdue")
                .with_usage("todo list overdue [flags]")
                .with_short_help("List pending tasks created before today")
                .with_handler(list_overdue),
        )
}

fn task_cmd() -> Command {
    Command::new("task")
        .with_usage("todo task <command> [flags]")
        .with_short_help("Manage tasks")
        .with_flags(|f| {
            f.string("file", "", "path to the tasks file");
        })
        .with_option(FlagOption::new("file").required().short('f'))
        .with_subcommand(
            Command::new("add")
                .with_usage("todo task add <text> [flags]")
                .with_short_help("Add a new task")
                .with_flags(|f| {
                    f.string("tags", "", "comma-separated list of tags");
                })
                .with_handler(task_add),
        )
        .with_subcommand(
            Command::new("done")
                .with_usage("todo task done <id> [flags]")
                .with_short_help("Mark a task as done")
                .with_handler(task_done),
        )
        .with_subcommand(
            Command::new("remove")
                .with_usage("todo task remove <id> [flags]")
                .with_short_help("Remove a task")
                .with_flags(|f| {
                    f.bool("force", false, "remove without confirmation")
                        .bool("all", false, "remove all tasks");
                })
                .with_handler(task_remove),
        )
}

fn root_cmd(_: &RunContext, state: &mut State<'_>) -> HandlerResult {
    if state.flag::<bool>("version")? {
        writeln!(state.stdout, "todo {}", env!("CARGO_PKG_VERSION"))?;
        return Ok(());
    }
    writeln!(
        state.stderr,
        "todo: subcommand required, use --help for more information"
    )?;
    Ok(())
}

fn load_tasks(
    state: &mut State<'_>,
) -> Result<(String, TaskList), Box<dyn std::error::Error + Send + Sync>> {
    let file: String = state.flag("file")?;
    let tasks = TaskList::load(&file)?;
    debug!(file = %file, tasks = tasks.tasks.len(), "Loaded task list");
    if state.flag::<bool>("verbose")? {
        writeln!(state.stderr, "loaded {} tasks from {file}", tasks.tasks.len())?;
    }
    Ok((file, tasks))
}

fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

fn filter_tags<'t>(tasks: Vec<&'t Task>, wanted: &[String]) -> Vec<&'t Task> {
    if wanted.is_empty() {
        return tasks;
    }
    tasks
        .into_iter()
        .filter(|task| task.tags.iter().any(|tag| wanted.contains(tag)))
        .collect()
}

fn print_tasks(
    state: &mut State<'_>,
    heading: &str,
    empty: &str,
    tasks: &[&Task],
) -> HandlerResult {
    if tasks.is_empty() {
        writeln!(state.stdout, "{empty}")?;
        return Ok(());
    }
    writeln!(state.stdout, "{heading}")?;
    for task in tasks {
        writeln!(state.stdout, "  {task}")?;
    }
    Ok(())
}

fn list_today(_: &RunContext, state: &mut State<'_>) -> HandlerResult {
    let (_, tasks) = load_tasks(state)?;
    let wanted = split_tags(&state.flag::<String>("tags")?);
    let today = filter_tags(tasks.list_today(Utc::now()), &wanted);
    print_tasks(state, "Tasks due today:", "No tasks due today, enjoy your day!", &today)
}

fn list_overdue(_: &RunContext, state: &mut State<'_>) -> HandlerResult {
    let (_, tasks) = load_tasks(state)?;
    let wanted = split_tags(&state.flag::<String>("tags")?);
    let overdue = filter_tags(tasks.list_overdue(Utc::now()), &wanted);
    print_tasks(state, "Overdue tasks:", "No overdue tasks, enjoy your day!", &overdue)
}

fn task_add(_: &RunContext, state: &mut State<'_>) -> HandlerResult {
    if state.args.is_empty() {
        return Err("task text required".into());
    }
    let (file, mut tasks) = load_tasks(state)?;
    let tags = split_tags(&state.flag::<String>("tags")?);
    let id = tasks.add(&state.args.join(" "), tags, Utc::now());
    tasks.save(&file)?;
    writeln!(state.stdout, "Task added with ID {id}")?;
    Ok(())
}

fn parse_id(state: &State<'_>) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
    let raw = state.args.first().ok_or("task ID required")?;
    raw.parse::<u64>()
        .map_err(|err| format!("invalid task ID {raw:?}: {err}").into())
}

fn task_done(_: &RunContext, state: &mut State<'_>) -> HandlerResult {
    let id = parse_id(state)?;
    let (file, mut tasks) = load_tasks(state)?;
    tasks.done(id)?;
    tasks.save(&file)?;
    writeln!(state.stdout, "Task {id} marked as done")?;
    Ok(())
}

fn task_remove(_: &RunContext, state: &mut State<'_>) -> HandlerResult {
    let force: bool = state.flag("force")?;
    let all: bool = state.flag("all")?;
    if state.args.is_empty() && !all {
        return Err("task ID required, or use --all to remove all tasks".into());
    }

    let (file, mut tasks) = load_tasks(state)?;
    if all {
        if !force && !confirm(state, "Are you sure you want to clear all tasks? (y/N): ")? {
            writeln!(state.stdout, "Operation cancelled")?;
            return Ok(());
        }
        tasks.clear();
        tasks.save(&file)?;
        writeln!(state.stdout, "All tasks removed")?;
        return Ok(());
    }

    let id = parse_id(state)?;
    if !force && !confirm(state, &format!("Are you sure you want to remove task {id}? (y/N): "))? {
        writeln!(state.stdout, "Operation cancelled")?;
        return Ok(());
    }
    tasks.remove(id)?;
    tasks.save(&file)?;
    writeln!(state.stdout, "Task {id} removed")?;
    Ok(())
}

fn confirm(
    state: &mut State<'_>,
    prompt: &str,
) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
    write!(state.stdout, "{prompt}")?;
    state.stdout.flush()?;

    let mut response = String::new();
    BufReader::new(&mut state.stdin)
        .read_line(&mut response)
        .map_err(|err| format!("failed to read input: {err}"))?;
    Ok(response.trim().eq_ignore_ascii_case("y"))
}
