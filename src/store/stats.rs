//! Read-only aggregates for the analytics view.

use chrono::{DateTime, Utc};

use crate::model::task::Priority;
use crate::store::Store;

/// Aggregates over one project's tasks (or the whole board)
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BoardStats {
    pub total: usize,
    pub completed: usize,
    /// Accumulated tracked seconds across the counted tasks
    pub time_tracked: u64,
    /// Due date in the past and not completed
    pub overdue: usize,
    pub high_pending: usize,
    pub medium_pending: usize,
    pub low_pending: usize,
}

impl BoardStats {
    /// Completed share in percent, 0 for an empty board
    pub fn completion_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64 * 100.0
        }
    }

    /// Mean tracked seconds per counted task
    pub fn avg_time_per_task(&self) -> u64 {
        if self.total == 0 {
            0
        } else {
            self.time_tracked / self.total as u64
        }
    }
}

/// Completion progress of a single project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectProgress {
    pub project_id: String,
    pub name: String,
    pub completed: usize,
    pub total: usize,
}

impl ProjectProgress {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64 * 100.0
        }
    }
}

/// Aggregate the tasks visible under `project_filter` (`None` = all)
pub fn board_stats(store: &Store, project_filter: Option<&str>, now: DateTime<Utc>) -> BoardStats {
    let mut stats = BoardStats::default();
    for task in store.tasks_for_project(project_filter) {
        stats.total += 1;
        stats.time_tracked += task.time_spent;
        if task.is_completed {
            stats.completed += 1;
            continue;
        }
        if task.due_date.is_some_and(|due| due < now) {
            stats.overdue += 1;
        }
        match task.priority {
            Priority::High => stats.high_pending += 1,
            Priority::Medium => stats.medium_pending += 1,
            Priority::Low => stats.low_pending += 1,
            Priority::None => {}
        }
    }
    stats
}

/// Per-project completion progress, in project order, always board-wide
pub fn project_progress(store: &Store) -> Vec<ProjectProgress> {
    store
        .projects
        .iter()
        .map(|project| {
            let mut completed = 0;
            let mut total = 0;
            for task in &store.tasks {
                if task.project_id == project.id {
                    total += 1;
                    if task.is_completed {
                        completed += 1;
                    }
                }
            }
            ProjectProgress {
                project_id: project.id.clone(),
                name: project.name.clone(),
                completed,
                total,
            }
        })
        .collect()
}

/// `"Xh Ym"` above an hour, `"Ym"` below — the coarse rendering used on
/// the analytics cards
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
