use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::column::Column;
use crate::model::profile::UserProfile;
use crate::model::project::Project;
use crate::model::task::{ActivityEntry, Task};
use crate::store::search::SearchHit;
use crate::store::stats::{BoardStats, ProjectProgress};
use crate::store::timer;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskJson {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub priority: String,
    pub column_id: String,
    pub project_id: String,
    pub order: u32,
    pub is_completed: bool,
    /// Live total: banked seconds plus the running span, if any
    pub time_spent: u64,
    pub is_timer_running: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardColumnJson {
    pub id: String,
    pub title: String,
    pub order: u32,
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardJson {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_project_id: Option<String>,
    pub columns: Vec<BoardColumnJson>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityJson {
    pub action: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectJson {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub selected: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsJson {
    pub total: usize,
    pub completed: usize,
    pub completion_rate: f64,
    pub time_tracked: u64,
    pub avg_time_per_task: u64,
    pub overdue: usize,
    pub high_pending: usize,
    pub medium_pending: usize,
    pub low_pending: usize,
    pub projects: Vec<ProjectProgressJson>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectProgressJson {
    pub id: String,
    pub name: String,
    pub completed: usize,
    pub total: usize,
    pub percent: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHitJson {
    pub task_id: String,
    pub title: String,
    pub field: String,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json(task: &Task, now: DateTime<Utc>) -> TaskJson {
    TaskJson {
        id: task.id.clone(),
        title: task.title.clone(),
        description: task.description.clone(),
        priority: task.priority.label().to_lowercase(),
        column_id: task.column_id.clone(),
        project_id: task.project_id.clone(),
        order: task.order,
        is_completed: task.is_completed,
        time_spent: timer::live_time_spent(task, now),
        is_timer_running: task.is_timer_running,
        created_at: task.created_at,
        due_date: task.due_date,
        completed_at: task.completed_at,
        tags: task.tags.clone(),
        dependencies: task.dependencies.clone(),
    }
}

pub fn activity_to_json(entry: &ActivityEntry) -> ActivityJson {
    ActivityJson {
        action: entry.action.as_str().to_string(),
        timestamp: entry.timestamp,
        details: entry.details.clone(),
    }
}

pub fn project_to_json(project: &Project, selected: bool) -> ProjectJson {
    ProjectJson {
        id: project.id.clone(),
        name: project.name.clone(),
        description: project.description.clone(),
        color: project.color.clone(),
        created_at: project.created_at,
        selected,
    }
}

pub fn stats_to_json(stats: &BoardStats, projects: &[ProjectProgress]) -> StatsJson {
    StatsJson {
        total: stats.total,
        completed: stats.completed,
        completion_rate: stats.completion_rate(),
        time_tracked: stats.time_tracked,
        avg_time_per_task: stats.avg_time_per_task(),
        overdue: stats.overdue,
        high_pending: stats.high_pending,
        medium_pending: stats.medium_pending,
        low_pending: stats.low_pending,
        projects: projects
            .iter()
            .map(|p| ProjectProgressJson {
                id: p.project_id.clone(),
                name: p.name.clone(),
                completed: p.completed,
                total: p.total,
                percent: p.percent(),
            })
            .collect(),
    }
}

pub fn hit_to_json(hit: &SearchHit) -> SearchHitJson {
    SearchHitJson {
        task_id: hit.task_id.clone(),
        title: hit.title.clone(),
        field: hit.field.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

/// Shortened id for board listings (`task-1f3a2b9c…` → `1f3a2b9c`)
pub fn short_id(id: &str) -> &str {
    let bare = id.split_once('-').map_or(id, |(_, rest)| rest);
    &bare[..bare.len().min(8)]
}

/// Tracked-time readout for listings. With `show_seconds` off, falls back
/// to the coarse `Xh Ym` rendering.
pub fn format_time_spent(seconds: u64, show_seconds: bool) -> String {
    if !show_seconds {
        return crate::store::stats::format_duration(seconds);
    }
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m {}s", minutes, seconds % 60)
    }
}

/// One-line summary of a column header
pub fn column_heading(column: &Column) -> String {
    format!("{} ({})", column.title, column.id)
}

/// One-line profile rendering
pub fn profile_lines(profile: &UserProfile) -> Vec<String> {
    let mut lines = vec![
        format!("name:  {}", profile.name),
        format!("email: {}", profile.email),
        format!("role:  {}", profile.role),
    ];
    if let Some(avatar) = &profile.avatar {
        lines.push(format!("avatar: {}", avatar));
    }
    lines
}
