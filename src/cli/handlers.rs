use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone, Utc};
use regex::Regex;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::snapshot::FileBackend;
use crate::model::config::Config;
use crate::model::task::{Activity, Priority};
use crate::store::clock::SystemClock;
use crate::store::{ordering, search, stats, timer, NewProject, NewTask, ProfilePatch, ProjectPatch, Store, TaskPatch};

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;
    let config = load_config()?;
    let data_dir = cli.data_dir.clone();

    match cli.command {
        // Read commands
        Commands::List(args) => cmd_list(args, &config, data_dir, json),
        Commands::Show(args) => cmd_show(args, &config, data_dir, json),
        Commands::Search(args) => cmd_search(args, &config, data_dir, json),
        Commands::Stats(args) => cmd_stats(args, &config, data_dir, json),
        Commands::Log(args) if args.add.is_none() => cmd_log_list(args, &config, data_dir, json),

        // Write commands
        Commands::Add(args) => cmd_add(args, &config, data_dir),
        Commands::Edit(args) => cmd_edit(args, &config, data_dir),
        Commands::Rm(args) => cmd_rm(args, &config, data_dir),
        Commands::Done(args) => cmd_done(args, &config, data_dir),
        Commands::Mv(args) => cmd_mv(args, &config, data_dir),
        Commands::Reorder(args) => cmd_reorder(args, &config, data_dir),
        Commands::Timer(args) => cmd_timer(args, &config, data_dir),
        Commands::Log(args) => cmd_log_add(args, &config, data_dir),

        // Column / project / profile management
        Commands::Column(args) => cmd_column(args, &config, data_dir, json),
        Commands::Project(args) => cmd_project(args, &config, data_dir, json),
        Commands::Profile(args) => cmd_profile(args, &config, data_dir, json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_config() -> Result<Config, config_io::ConfigError> {
    match config_io::config_path() {
        Some(path) => config_io::load_config(&path),
        None => Ok(Config::default()),
    }
}

/// Resolve where the snapshot lives: `--data-dir` flag, then the config
/// override, then the platform data directory.
fn snapshot_backend(config: &Config, data_dir: Option<String>) -> FileBackend {
    if let Some(dir) = data_dir {
        return FileBackend::in_dir(&PathBuf::from(dir));
    }
    if let Some(path) = &config.storage.path {
        return FileBackend::new(path.clone());
    }
    let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    FileBackend::in_dir(&base.join("taskflow"))
}

fn open_store(
    config: &Config,
    data_dir: Option<String>,
) -> Result<Store, Box<dyn std::error::Error>> {
    let backend = snapshot_backend(config, data_dir);
    Ok(Store::open(Box::new(backend), Arc::new(SystemClock))?)
}

/// Resolve user input to a full id: exact match first, then a unique prefix
/// of either the full id or its bare part (the text after `task-` etc.).
fn resolve_id(kind: &str, input: &str, ids: &[&str]) -> Result<String, String> {
    if let Some(id) = ids.iter().find(|id| **id == input) {
        return Ok((*id).to_string());
    }
    let matches: Vec<&str> = ids
        .iter()
        .copied()
        .filter(|id| {
            id.starts_with(input)
                || id
                    .split_once('-')
                    .is_some_and(|(_, bare)| bare.starts_with(input))
        })
        .collect();
    match matches.as_slice() {
        [id] => Ok((*id).to_string()),
        [] => Err(format!("no such {}: {}", kind, input)),
        _ => Err(format!("ambiguous {} id: {}", kind, input)),
    }
}

fn resolve_task_id(store: &Store, input: &str) -> Result<String, String> {
    let ids: Vec<&str> = store.tasks.iter().map(|t| t.id.as_str()).collect();
    resolve_id("task", input, &ids)
}

fn resolve_column_id(store: &Store, input: &str) -> Result<String, String> {
    let ids: Vec<&str> = store.columns.iter().map(|c| c.id.as_str()).collect();
    resolve_id("column", input, &ids)
}

fn resolve_project_id(store: &Store, input: &str) -> Result<String, String> {
    let ids: Vec<&str> = store.projects.iter().map(|p| p.id.as_str()).collect();
    resolve_id("project", input, &ids)
}

fn parse_priority_arg(s: &str) -> Result<Priority, String> {
    Priority::parse_priority(s)
        .ok_or_else(|| format!("invalid priority '{}': use none, low, medium, or high", s))
}

/// Accept `YYYY-MM-DD` (midnight UTC) or a full RFC 3339 timestamp
fn parse_due(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let midnight = NaiveDateTime::new(date, NaiveTime::MIN);
        return Ok(Utc.from_utc_datetime(&midnight));
    }
    Err(format!("invalid date '{}': use YYYY-MM-DD or RFC 3339", s))
}

/// Where a new or moved task lands by default: one past the last order in
/// the column (max+1, so sparse orders cannot collide).
fn next_order(store: &Store, column_id: &str) -> u32 {
    store
        .tasks_in_column(column_id)
        .last()
        .map(|t| t.order + 1)
        .unwrap_or(0)
}

fn timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(
    args: ListArgs,
    config: &Config,
    data_dir: Option<String>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(config, data_dir)?;
    let now = Utc::now();

    let project_filter = if args.all_projects {
        None
    } else {
        store.selected_project_id.clone()
    };

    let mut columns: Vec<_> = store.columns.iter().collect();
    columns.sort_by_key(|c| c.order);
    if let Some(only) = &args.column {
        let id = resolve_column_id(&store, only)?;
        columns.retain(|c| c.id == id);
    }

    if json {
        let board = BoardJson {
            selected_project_id: project_filter.clone(),
            columns: columns
                .iter()
                .map(|column| BoardColumnJson {
                    id: column.id.clone(),
                    title: column.title.clone(),
                    order: column.order,
                    tasks: store
                        .tasks_in_column(&column.id)
                        .into_iter()
                        .filter(|t| {
                            project_filter
                                .as_deref()
                                .is_none_or(|p| t.project_id == p)
                        })
                        .map(|t| task_to_json(t, now))
                        .collect(),
                })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&board)?);
        return Ok(());
    }

    match project_filter
        .as_deref()
        .and_then(|id| store.project(id))
    {
        Some(project) => println!("Board — {}", project.name),
        None => println!("Board — all projects"),
    }

    for column in columns {
        println!();
        println!(" {}", column_heading(column));
        let tasks: Vec<_> = store
            .tasks_in_column(&column.id)
            .into_iter()
            .filter(|t| {
                project_filter
                    .as_deref()
                    .is_none_or(|p| t.project_id == p)
            })
            .collect();
        if tasks.is_empty() {
            println!("  (empty)");
            continue;
        }
        for task in tasks {
            let mut line = format!(
                "  {}  [{}] {}",
                short_id(&task.id),
                if task.is_completed { "x" } else { " " },
                task.title,
            );
            if task.priority != Priority::None {
                line.push_str(&format!("  !{}", task.priority.label().to_lowercase()));
            }
            let live = timer::live_time_spent(task, now);
            if live > 0 || task.is_timer_running {
                line.push_str(&format!(
                    "  {}",
                    format_time_spent(live, config.ui.show_seconds)
                ));
            }
            if task.is_timer_running {
                line.push_str("  (timer running)");
            }
            if let Some(due) = task.due_date {
                if due < now && !task.is_completed {
                    line.push_str(&format!("  OVERDUE {}", due.format("%Y-%m-%d")));
                } else {
                    line.push_str(&format!("  due {}", due.format("%Y-%m-%d")));
                }
            }
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_show(
    args: ShowArgs,
    config: &Config,
    data_dir: Option<String>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(config, data_dir)?;
    let id = resolve_task_id(&store, &args.id)?;
    let now = Utc::now();
    let task = store.task(&id).ok_or("task vanished during lookup")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&task_to_json(task, now))?);
        return Ok(());
    }

    println!("{}  {}", task.id, task.title);
    if !task.description.is_empty() {
        println!("  {}", task.description);
    }
    println!("  column:   {}", task.column_id);
    println!("  project:  {}", task.project_id);
    println!("  order:    {}", task.order);
    println!("  priority: {}", task.priority.label());
    println!("  created:  {}", timestamp(task.created_at));
    if let Some(due) = task.due_date {
        println!("  due:      {}", timestamp(due));
    }
    if task.is_completed {
        match task.completed_at {
            Some(at) => println!("  completed: {}", timestamp(at)),
            None => println!("  completed"),
        }
    }
    let live = timer::live_time_spent(task, now);
    println!(
        "  tracked:  {}{}",
        format_time_spent(live, config.ui.show_seconds),
        if task.is_timer_running {
            " (timer running)"
        } else {
            ""
        }
    );
    if !task.tags.is_empty() {
        println!("  tags:     {}", task.tags.join(", "));
    }
    if !task.dependencies.is_empty() {
        println!("  deps:     {}", task.dependencies.join(", "));
    }
    println!("  activity: {} entries", task.activity_log.len());
    Ok(())
}

fn cmd_search(
    args: SearchArgs,
    config: &Config,
    data_dir: Option<String>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(config, data_dir)?;
    let re = Regex::new(&args.pattern)?;
    let project_filter = if args.all_projects {
        None
    } else {
        store.selected_project_id.clone()
    };

    let hits = search::search_tasks(&store, &re, project_filter.as_deref());

    if json {
        let out: Vec<_> = hits.iter().map(hit_to_json).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if hits.is_empty() {
        println!("no matches");
        return Ok(());
    }
    for hit in &hits {
        println!("{}  {}  ({})", short_id(&hit.task_id), hit.title, hit.field);
    }
    Ok(())
}

fn cmd_stats(
    args: StatsArgs,
    config: &Config,
    data_dir: Option<String>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(config, data_dir)?;
    let now = Utc::now();
    let project_filter = if args.all_projects {
        None
    } else {
        store.selected_project_id.clone()
    };

    let board = stats::board_stats(&store, project_filter.as_deref(), now);
    let progress = stats::project_progress(&store);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&stats_to_json(&board, &progress))?
        );
        return Ok(());
    }

    println!(
        " tasks      {:>5}  ({} completed, {:.0}%)",
        board.total,
        board.completed,
        board.completion_rate()
    );
    println!(
        " tracked    {:>5}  ({} avg per task)",
        stats::format_duration(board.time_tracked),
        stats::format_duration(board.avg_time_per_task())
    );
    println!(" overdue    {:>5}", board.overdue);
    println!(
        " pending    {:>5} high  {} medium  {} low",
        board.high_pending, board.medium_pending, board.low_pending
    );

    if !progress.is_empty() {
        println!();
        let name_w = progress.iter().map(|p| p.name.len()).max().unwrap_or(0);
        for p in &progress {
            println!(
                " {:<name_w$}  {:>3.0}%  ({}/{})",
                p.name,
                p.percent(),
                p.completed,
                p.total,
                name_w = name_w,
            );
        }
    }
    Ok(())
}

fn cmd_log_list(
    args: LogArgs,
    config: &Config,
    data_dir: Option<String>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(config, data_dir)?;
    let id = resolve_task_id(&store, &args.id)?;
    let task = store.task(&id).ok_or("task vanished during lookup")?;

    if json {
        let out: Vec<_> = task.activity_log.iter().map(activity_to_json).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for entry in &task.activity_log {
        match &entry.details {
            Some(details) => println!(
                "{}  {}  {}",
                timestamp(entry.timestamp),
                entry.action,
                details
            ),
            None => println!("{}  {}", timestamp(entry.timestamp), entry.action),
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(
    args: AddArgs,
    config: &Config,
    data_dir: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store(config, data_dir)?;

    let column_id = resolve_column_id(&store, &args.column)?;
    let project_id = match &args.project {
        Some(project) => resolve_project_id(&store, project)?,
        None => store
            .selected_project_id
            .clone()
            .unwrap_or_else(|| "default".to_string()),
    };
    let priority = parse_priority_arg(&args.priority)?;
    let due_date = args.due.as_deref().map(parse_due).transpose()?;
    let order = next_order(&store, &column_id);

    let id = store.add_task(NewTask {
        title: args.title,
        description: args.description.unwrap_or_default(),
        priority,
        column_id,
        project_id,
        order,
        due_date,
    })?;
    println!("{}", id);
    Ok(())
}

fn cmd_edit(
    args: EditArgs,
    config: &Config,
    data_dir: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store(config, data_dir)?;
    let id = resolve_task_id(&store, &args.id)?;

    let priority = args
        .priority
        .as_deref()
        .map(parse_priority_arg)
        .transpose()?;
    let due_date = if args.clear_due {
        Some(None)
    } else {
        args.due.as_deref().map(parse_due).transpose()?.map(Some)
    };

    store.update_task(
        &id,
        TaskPatch {
            title: args.title,
            description: args.description,
            priority,
            due_date,
            ..Default::default()
        },
    );
    println!("{}", id);
    Ok(())
}

fn cmd_rm(
    args: RmArgs,
    config: &Config,
    data_dir: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store(config, data_dir)?;
    for input in &args.ids {
        let id = resolve_task_id(&store, input)?;
        store.delete_task(&id);
        println!("deleted {}", id);
    }
    Ok(())
}

fn cmd_done(
    args: TaskIdArg,
    config: &Config,
    data_dir: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store(config, data_dir)?;
    let id = resolve_task_id(&store, &args.id)?;
    timer::toggle_complete(&mut store, &id);
    let task = store.task(&id).ok_or("task vanished during toggle")?;
    println!(
        "{} {}",
        if task.is_completed {
            "completed"
        } else {
            "reopened"
        },
        id
    );
    Ok(())
}

fn cmd_mv(
    args: MvArgs,
    config: &Config,
    data_dir: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store(config, data_dir)?;
    let id = resolve_task_id(&store, &args.id)?;
    let column_id = resolve_column_id(&store, &args.column)?;
    let position = args
        .position
        .unwrap_or_else(|| next_order(&store, &column_id));

    ordering::move_task(&mut store, &id, &column_id, position);
    println!("{} -> {} @ {}", id, column_id, position);
    Ok(())
}

fn cmd_reorder(
    args: ReorderArgs,
    config: &Config,
    data_dir: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store(config, data_dir)?;
    let column_id = resolve_column_id(&store, &args.column)?;
    let mut ids = Vec::with_capacity(args.ids.len());
    for input in &args.ids {
        ids.push(resolve_task_id(&store, input)?);
    }

    ordering::reorder_tasks(&mut store, &column_id, &ids);
    println!("reordered {} ({} tasks)", column_id, ids.len());
    Ok(())
}

fn cmd_timer(
    args: TimerCmd,
    config: &Config,
    data_dir: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store(config, data_dir)?;
    match args.action {
        TimerAction::Start(arg) => {
            let id = resolve_task_id(&store, &arg.id)?;
            timer::start_timer(&mut store, &id);
            println!("timer started on {}", id);
        }
        TimerAction::Stop(arg) => {
            let id = resolve_task_id(&store, &arg.id)?;
            let was_running = store.task(&id).is_some_and(|t| t.is_timer_running);
            timer::stop_timer(&mut store, &id);
            if was_running {
                let task = store.task(&id).ok_or("task vanished during stop")?;
                println!(
                    "timer stopped on {} ({} tracked)",
                    id,
                    timer::format_elapsed(task.time_spent)
                );
            } else {
                println!("timer was not running on {}", id);
            }
        }
    }
    Ok(())
}

fn cmd_log_add(
    args: LogArgs,
    config: &Config,
    data_dir: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store(config, data_dir)?;
    let id = resolve_task_id(&store, &args.id)?;
    let action = Activity::from(args.add.unwrap_or_default());
    store.add_activity(&id, action, args.details);
    println!("logged on {}", id);
    Ok(())
}

// ---------------------------------------------------------------------------
// Column management
// ---------------------------------------------------------------------------

fn cmd_column(
    args: ColumnCmd,
    config: &Config,
    data_dir: Option<String>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store(config, data_dir)?;
    match args.action {
        ColumnAction::Add(add) => {
            let id = store.add_column(add.title);
            println!("{}", id);
        }
        ColumnAction::Rm(arg) => {
            let id = resolve_column_id(&store, &arg.id)?;
            let cascades = store.tasks_in_column(&id).len();
            store.delete_column(&id);
            println!("deleted {} ({} tasks with it)", id, cascades);
        }
        ColumnAction::List => {
            let mut columns: Vec<_> = store.columns.iter().collect();
            columns.sort_by_key(|c| c.order);
            if json {
                println!("{}", serde_json::to_string_pretty(&columns)?);
            } else {
                for column in columns {
                    println!("{:>2}  {}  {}", column.order, column.id, column.title);
                }
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Project management
// ---------------------------------------------------------------------------

fn cmd_project(
    args: ProjectCmd,
    config: &Config,
    data_dir: Option<String>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store(config, data_dir)?;
    match args.action {
        ProjectAction::Add(add) => {
            let id = store.add_project(NewProject {
                name: add.name,
                description: add.description,
                color: add.color,
            });
            println!("{}", id);
        }
        ProjectAction::Edit(edit) => {
            let id = resolve_project_id(&store, &edit.id)?;
            store.update_project(
                &id,
                ProjectPatch {
                    name: edit.name,
                    description: edit.description.map(Some),
                    color: edit.color,
                },
            );
            println!("{}", id);
        }
        ProjectAction::Rm(arg) => {
            let id = resolve_project_id(&store, &arg.id)?;
            let cascades = store
                .tasks
                .iter()
                .filter(|t| t.project_id == id)
                .count();
            store.delete_project(&id);
            println!("deleted {} ({} tasks with it)", id, cascades);
        }
        ProjectAction::Select(select) => {
            if select.all {
                store.set_selected_project(None);
                println!("showing all projects");
            } else {
                let input = select.id.ok_or("give a project id or --all")?;
                let id = resolve_project_id(&store, &input)?;
                store.set_selected_project(Some(id.clone()));
                println!("selected {}", id);
            }
        }
        ProjectAction::List => {
            let selected = store.selected_project_id.clone();
            if json {
                let out: Vec<_> = store
                    .projects
                    .iter()
                    .map(|p| project_to_json(p, selected.as_deref() == Some(p.id.as_str())))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                for project in &store.projects {
                    let marker = if selected.as_deref() == Some(project.id.as_str()) {
                        "*"
                    } else {
                        " "
                    };
                    println!("{} {}  {}", marker, short_id(&project.id), project.name);
                }
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

fn cmd_profile(
    args: ProfileCmd,
    config: &Config,
    data_dir: Option<String>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store(config, data_dir)?;
    match args.action {
        Some(ProfileAction::Edit(edit)) => {
            store.update_user_profile(ProfilePatch {
                name: edit.name,
                email: edit.email,
                role: edit.role,
                avatar: edit.avatar.map(Some),
            });
            println!("profile updated");
        }
        None => {
            if json {
                println!("{}", serde_json::to_string_pretty(&store.user_profile)?);
            } else {
                for line in profile_lines(&store.user_profile) {
                    println!("{}", line);
                }
            }
        }
    }
    Ok(())
}
