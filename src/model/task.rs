use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Task priority label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl Priority {
    /// Display label shown on task cards
    pub fn label(self) -> &'static str {
        match self {
            Priority::None => "None",
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    /// Parse a priority name as given on the command line
    pub fn parse_priority(s: &str) -> Option<Priority> {
        match s {
            "none" => Some(Priority::None),
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

/// What happened to a task.
///
/// The five lifecycle actions are closed variants; anything else round-trips
/// through `Custom` so snapshots written by other front ends stay intact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Activity {
    Created,
    Completed,
    Reopened,
    TimerStarted,
    TimerStopped,
    Custom(String),
}

impl Activity {
    pub fn as_str(&self) -> &str {
        match self {
            Activity::Created => "created",
            Activity::Completed => "completed",
            Activity::Reopened => "reopened",
            Activity::TimerStarted => "timer_started",
            Activity::TimerStopped => "timer_stopped",
            Activity::Custom(s) => s,
        }
    }
}

impl From<String> for Activity {
    fn from(s: String) -> Self {
        match s.as_str() {
            "created" => Activity::Created,
            "completed" => Activity::Completed,
            "reopened" => Activity::Reopened,
            "timer_started" => Activity::TimerStarted,
            "timer_stopped" => Activity::TimerStopped,
            _ => Activity::Custom(s),
        }
    }
}

impl From<Activity> for String {
    fn from(a: Activity) -> String {
        a.as_str().to_string()
    }
}

impl std::fmt::Display for Activity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry in a task's append-only activity log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub id: String,
    pub action: Activity,
    pub timestamp: DateTime<Utc>,
    /// Free text, e.g. the elapsed-time summary on `timer_stopped`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ActivityEntry {
    /// Create an entry with a fresh id and no details
    pub fn new(action: Activity, timestamp: DateTime<Utc>) -> Self {
        ActivityEntry {
            id: format!("log-{}", Uuid::new_v4()),
            action,
            timestamp,
            details: None,
        }
    }

    pub fn with_details(mut self, details: String) -> Self {
        self.details = Some(details);
        self
    }
}

/// A task on the board.
///
/// `order` sorts tasks within their column; values are unique per column but
/// only contiguous right after a reorder (moves leave gaps open).
/// Snapshot field names stay camelCase for compatibility with snapshots
/// written by earlier front ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    pub column_id: String,
    pub project_id: String,
    pub order: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_completed: bool,
    /// Set on completion, cleared on reopen
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Accumulated tracked time in seconds
    #[serde(default)]
    pub time_spent: u64,
    #[serde(default)]
    pub is_timer_running: bool,
    /// Present while the timer runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_timer_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub activity_log: Vec<ActivityEntry>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
}
