use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tf", about = concat!("[=] taskflow v", env!("CARGO_PKG_VERSION"), " - kanban board, timers, and analytics"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Keep the board snapshot in a different directory
    #[arg(long = "data-dir", global = true)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the board
    List(ListArgs),
    /// Show task details
    Show(ShowArgs),
    /// Search tasks by regex
    Search(SearchArgs),
    /// Show board analytics
    Stats(StatsArgs),
    /// Add a task
    Add(AddArgs),
    /// Edit task fields
    Edit(EditArgs),
    /// Delete tasks
    Rm(RmArgs),
    /// Complete a task (or reopen a completed one)
    Done(TaskIdArg),
    /// Move a task to a column position
    Mv(MvArgs),
    /// Re-lay-out one column to an explicit task sequence
    Reorder(ReorderArgs),
    /// Start or stop a task's timer
    Timer(TimerCmd),
    /// Show a task's activity log, or append a custom entry
    Log(LogArgs),
    /// Column management
    Column(ColumnCmd),
    /// Project management
    Project(ProjectCmd),
    /// Show or edit the user profile
    Profile(ProfileCmd),
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ListArgs {
    /// Only this column
    #[arg(long)]
    pub column: Option<String>,
    /// Ignore the project selection and list every project's tasks
    #[arg(long)]
    pub all_projects: bool,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Task id (a unique prefix works)
    pub id: String,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Regex pattern to search for
    pub pattern: String,
    /// Search every project, not just the selected one
    #[arg(long)]
    pub all_projects: bool,
}

#[derive(Args)]
pub struct StatsArgs {
    /// Aggregate every project, not just the selected one
    #[arg(long)]
    pub all_projects: bool,
}

// ---------------------------------------------------------------------------
// Write command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Task title
    pub title: String,
    /// Longer description
    #[arg(long, short = 'd')]
    pub description: Option<String>,
    /// Priority (none, low, medium, high)
    #[arg(long, short = 'p', default_value = "none")]
    pub priority: String,
    /// Column to add the task to
    #[arg(long, short = 'c', default_value = "todo")]
    pub column: String,
    /// Project (default: the selected project)
    #[arg(long)]
    pub project: Option<String>,
    /// Due date (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub due: Option<String>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task id
    pub id: String,
    /// New title
    #[arg(long)]
    pub title: Option<String>,
    /// New description
    #[arg(long, short = 'd')]
    pub description: Option<String>,
    /// New priority (none, low, medium, high)
    #[arg(long, short = 'p')]
    pub priority: Option<String>,
    /// New due date (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub due: Option<String>,
    /// Remove the due date
    #[arg(long, conflicts_with = "due")]
    pub clear_due: bool,
}

#[derive(Args)]
pub struct RmArgs {
    /// Task ids to delete
    #[arg(required = true)]
    pub ids: Vec<String>,
}

#[derive(Args)]
pub struct TaskIdArg {
    /// Task id (a unique prefix works)
    pub id: String,
}

#[derive(Args)]
pub struct MvArgs {
    /// Task id
    pub id: String,
    /// Destination column
    pub column: String,
    /// Position in the destination column (0 = top; default: bottom)
    pub position: Option<u32>,
}

#[derive(Args)]
pub struct ReorderArgs {
    /// Column to re-lay-out
    pub column: String,
    /// The full desired task sequence, top to bottom
    #[arg(required = true)]
    pub ids: Vec<String>,
}

#[derive(Args)]
pub struct TimerCmd {
    #[command(subcommand)]
    pub action: TimerAction,
}

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start the timer (restarts the span if already running)
    Start(TaskIdArg),
    /// Stop the timer and bank the elapsed time
    Stop(TaskIdArg),
}

#[derive(Args)]
pub struct LogArgs {
    /// Task id
    pub id: String,
    /// Append an entry with this action instead of listing
    #[arg(long)]
    pub add: Option<String>,
    /// Free-text details for the appended entry
    #[arg(long, requires = "add")]
    pub details: Option<String>,
}

// ---------------------------------------------------------------------------
// Column management
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ColumnCmd {
    #[command(subcommand)]
    pub action: ColumnAction,
}

#[derive(Subcommand)]
pub enum ColumnAction {
    /// Add a column at the right edge of the board
    Add(ColumnAddArgs),
    /// Delete a column and every task in it
    Rm(ColumnIdArg),
    /// List columns
    List,
}

#[derive(Args)]
pub struct ColumnAddArgs {
    /// Column title
    pub title: String,
}

#[derive(Args)]
pub struct ColumnIdArg {
    /// Column id
    pub id: String,
}

// ---------------------------------------------------------------------------
// Project management
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ProjectCmd {
    #[command(subcommand)]
    pub action: ProjectAction,
}

#[derive(Subcommand)]
pub enum ProjectAction {
    /// Create a project
    Add(ProjectAddArgs),
    /// Edit project fields
    Edit(ProjectEditArgs),
    /// Delete a project and every task in it
    Rm(ProjectIdArg),
    /// Select the active project (omit the id with --all)
    Select(ProjectSelectArgs),
    /// List projects
    List,
}

#[derive(Args)]
pub struct ProjectAddArgs {
    /// Project name
    pub name: String,
    /// Description
    #[arg(long, short = 'd')]
    pub description: Option<String>,
    /// Display color
    #[arg(long, default_value = "#6366f1")]
    pub color: String,
}

#[derive(Args)]
pub struct ProjectEditArgs {
    /// Project id
    pub id: String,
    /// New name
    #[arg(long)]
    pub name: Option<String>,
    /// New description
    #[arg(long, short = 'd')]
    pub description: Option<String>,
    /// New display color
    #[arg(long)]
    pub color: Option<String>,
}

#[derive(Args)]
pub struct ProjectIdArg {
    /// Project id
    pub id: String,
}

#[derive(Args)]
pub struct ProjectSelectArgs {
    /// Project id (omit with --all)
    pub id: Option<String>,
    /// Show all projects
    #[arg(long, conflicts_with = "id")]
    pub all: bool,
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ProfileCmd {
    #[command(subcommand)]
    pub action: Option<ProfileAction>,
}

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Update profile fields
    Edit(ProfileEditArgs),
}

#[derive(Args)]
pub struct ProfileEditArgs {
    /// Display name
    #[arg(long)]
    pub name: Option<String>,
    /// Email address
    #[arg(long)]
    pub email: Option<String>,
    /// Role shown on the profile
    #[arg(long)]
    pub role: Option<String>,
    /// Avatar image path or URL
    #[arg(long)]
    pub avatar: Option<String>,
}
