use std::ops::Range;

use regex::Regex;

use crate::model::task::Task;
use crate::store::Store;

/// Which field of a task matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchField {
    Title,
    Description,
    Tag,
}

impl std::fmt::Display for MatchField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchField::Title => write!(f, "title"),
            MatchField::Description => write!(f, "description"),
            MatchField::Tag => write!(f, "tag"),
        }
    }
}

/// A search hit on a task field
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub task_id: String,
    pub title: String,
    pub field: MatchField,
    pub spans: Vec<Range<usize>>,
}

/// Collect all non-overlapping match byte-ranges for a regex in the given text.
fn find_matches(re: &Regex, text: &str) -> Vec<Range<usize>> {
    re.find_iter(text).map(|m| m.start()..m.end()).collect()
}

/// Search tasks by title, description, and tags.
///
/// If `project_filter` is `Some`, only that project's tasks are searched;
/// `None` searches the whole board.
pub fn search_tasks(store: &Store, re: &Regex, project_filter: Option<&str>) -> Vec<SearchHit> {
    let mut hits = Vec::new();
    for task in store.tasks_for_project(project_filter) {
        search_task(re, task, &mut hits);
    }
    hits
}

fn search_task(re: &Regex, task: &Task, hits: &mut Vec<SearchHit>) {
    let spans = find_matches(re, &task.title);
    if !spans.is_empty() {
        hits.push(SearchHit {
            task_id: task.id.clone(),
            title: task.title.clone(),
            field: MatchField::Title,
            spans,
        });
    }

    let spans = find_matches(re, &task.description);
    if !spans.is_empty() {
        hits.push(SearchHit {
            task_id: task.id.clone(),
            title: task.title.clone(),
            field: MatchField::Description,
            spans,
        });
    }

    for tag in &task.tags {
        let spans = find_matches(re, tag);
        if !spans.is_empty() {
            hits.push(SearchHit {
                task_id: task.id.clone(),
                title: task.title.clone(),
                field: MatchField::Tag,
                spans,
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
