pub mod clock;
pub mod ordering;
pub mod search;
pub mod stats;
pub mod timer;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::io::snapshot::{Snapshot, SnapshotBackend, SnapshotError};
use crate::model::column::Column;
use crate::model::profile::UserProfile;
use crate::model::project::Project;
use crate::model::task::{Activity, ActivityEntry, Priority, Task};
use clock::Clock;

/// Error type for store operations.
///
/// Mutations on unknown ids are deliberately silent no-ops, so the only
/// fallible operation is task creation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("task title cannot be empty")]
    EmptyTitle,
}

/// Input for [`Store::add_task`]
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub column_id: String,
    pub project_id: String,
    pub order: u32,
    pub due_date: Option<DateTime<Utc>>,
}

/// Shallow-merge patch for [`Store::update_task`].
///
/// `None` leaves a field alone; `due_date` is doubly optional so a patch can
/// also clear the date.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub column_id: Option<String>,
    pub project_id: Option<String>,
    pub order: Option<u32>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub tags: Option<Vec<String>>,
    pub dependencies: Option<Vec<String>>,
}

/// Input for [`Store::add_project`]
#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
    pub color: String,
}

/// Shallow-merge patch for [`Store::update_project`]
#[derive(Debug, Clone, Default)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub color: Option<String>,
}

/// Shallow-merge patch for [`Store::update_user_profile`]
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub avatar: Option<Option<String>>,
}

/// Single source of truth for the board.
///
/// Every mutation runs to completion synchronously, then hands the new
/// snapshot to the attached backend. There is no ambient global instance;
/// callers construct a store (tests construct several) and pass it around.
pub struct Store {
    pub tasks: Vec<Task>,
    pub columns: Vec<Column>,
    pub projects: Vec<Project>,
    pub selected_project_id: Option<String>,
    pub user_profile: UserProfile,
    clock: Arc<dyn Clock>,
    backend: Option<Box<dyn SnapshotBackend>>,
}

impl Store {
    /// An empty store: no columns, no projects, nothing selected.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Store {
            tasks: Vec::new(),
            columns: Vec::new(),
            projects: Vec::new(),
            selected_project_id: None,
            user_profile: UserProfile::default(),
            clock,
            backend: None,
        }
    }

    /// A first-run store: default columns, the default project (selected),
    /// and the default profile.
    pub fn with_defaults(clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        let mut store = Store::new(clock);
        store.columns = Column::defaults();
        store.projects = vec![Project::default_project(now)];
        store.selected_project_id = Some("default".to_string());
        store
    }

    /// Rehydrate from a backend if it holds a snapshot, else start fresh
    /// with defaults. The backend stays attached and receives every
    /// subsequent snapshot.
    pub fn open(
        backend: Box<dyn SnapshotBackend>,
        clock: Arc<dyn Clock>,
    ) -> Result<Store, SnapshotError> {
        let mut store = match backend.load()? {
            Some(snapshot) => Store::from_snapshot(snapshot, clock),
            None => Store::with_defaults(clock),
        };
        store.backend = Some(backend);
        Ok(store)
    }

    pub fn from_snapshot(snapshot: Snapshot, clock: Arc<dyn Clock>) -> Store {
        Store {
            tasks: snapshot.tasks,
            columns: snapshot.columns,
            projects: snapshot.projects,
            selected_project_id: snapshot.selected_project_id,
            user_profile: snapshot.user_profile,
            clock,
            backend: None,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tasks: self.tasks.clone(),
            columns: self.columns.clone(),
            projects: self.projects.clone(),
            selected_project_id: self.selected_project_id.clone(),
            user_profile: self.user_profile.clone(),
        }
    }

    /// Attach (or replace) the persistence backend
    pub fn set_backend(&mut self, backend: Box<dyn SnapshotBackend>) {
        self.backend = Some(backend);
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Notify the backend after a successful mutation. Persistence is
    /// fire-and-forget: a failed write is reported, never propagated.
    pub(crate) fn touch(&mut self) {
        let snapshot = self.snapshot();
        if let Some(backend) = &mut self.backend
            && let Err(e) = backend.persist(&snapshot)
        {
            eprintln!("warning: could not persist snapshot: {}", e);
        }
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub(crate) fn task_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    pub fn column(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Tasks in one column, sorted by `order`
    pub fn tasks_in_column(&self, column_id: &str) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|t| t.column_id == column_id)
            .collect();
        tasks.sort_by_key(|t| t.order);
        tasks
    }

    /// Tasks visible under a project filter (`None` = all projects)
    pub fn tasks_for_project(&self, project_id: Option<&str>) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| project_id.is_none_or(|p| t.project_id == p))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Task CRUD
    // -----------------------------------------------------------------------

    /// Create a task and return its id.
    ///
    /// The title must be non-empty (the original UI enforced this in the
    /// form layer; here it is a store contract). The generated id is checked
    /// against the collection so it can never collide.
    pub fn add_task(&mut self, input: NewTask) -> Result<String, StoreError> {
        if input.title.trim().is_empty() {
            return Err(StoreError::EmptyTitle);
        }
        let now = self.now();
        let id = self.fresh_task_id();
        self.tasks.push(Task {
            id: id.clone(),
            title: input.title,
            description: input.description,
            priority: input.priority,
            column_id: input.column_id,
            project_id: input.project_id,
            order: input.order,
            created_at: now,
            due_date: input.due_date,
            is_completed: false,
            completed_at: None,
            time_spent: 0,
            is_timer_running: false,
            last_timer_start: None,
            activity_log: vec![ActivityEntry::new(Activity::Created, now)],
            tags: Vec::new(),
            dependencies: Vec::new(),
        });
        self.touch();
        Ok(id)
    }

    /// Shallow-merge `patch` into the matching task. Unknown id: no-op.
    /// Does not touch the activity log; callers log via [`Store::add_activity`].
    pub fn update_task(&mut self, id: &str, patch: TaskPatch) {
        let Some(task) = self.task_mut(id) else {
            return;
        };
        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(column_id) = patch.column_id {
            task.column_id = column_id;
        }
        if let Some(project_id) = patch.project_id {
            task.project_id = project_id;
        }
        if let Some(order) = patch.order {
            task.order = order;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = due_date;
        }
        if let Some(tags) = patch.tags {
            task.tags = tags;
        }
        if let Some(dependencies) = patch.dependencies {
            task.dependencies = dependencies;
        }
        self.touch();
    }

    /// Remove a task. Sibling `order` values keep their gap; only an
    /// explicit reorder densifies.
    pub fn delete_task(&mut self, id: &str) {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() != before {
            self.touch();
        }
    }

    /// Append an activity entry to a task's log. Unknown id: no-op.
    pub fn add_activity(&mut self, id: &str, action: Activity, details: Option<String>) {
        let now = self.now();
        let Some(task) = self.task_mut(id) else {
            return;
        };
        let mut entry = ActivityEntry::new(action, now);
        entry.details = details;
        task.activity_log.push(entry);
        self.touch();
    }

    // -----------------------------------------------------------------------
    // Column CRUD
    // -----------------------------------------------------------------------

    /// Append a column at the right edge of the board. Returns its id.
    pub fn add_column(&mut self, title: String) -> String {
        let id = format!("column-{}", Uuid::new_v4());
        let order = self.columns.len() as u32;
        self.columns.push(Column {
            id: id.clone(),
            title,
            order,
        });
        self.touch();
        id
    }

    /// Remove a column and every task in it. The store permits deleting the
    /// default lanes too; protecting them is a front-end concern.
    pub fn delete_column(&mut self, id: &str) {
        let before = self.columns.len() + self.tasks.len();
        self.columns.retain(|c| c.id != id);
        self.tasks.retain(|t| t.column_id != id);
        if self.columns.len() + self.tasks.len() != before {
            self.touch();
        }
    }

    // -----------------------------------------------------------------------
    // Project CRUD
    // -----------------------------------------------------------------------

    pub fn add_project(&mut self, input: NewProject) -> String {
        let now = self.now();
        let id = format!("project-{}", Uuid::new_v4());
        self.projects.push(Project {
            id: id.clone(),
            name: input.name,
            description: input.description,
            color: input.color,
            created_at: now,
        });
        self.touch();
        id
    }

    pub fn update_project(&mut self, id: &str, patch: ProjectPatch) {
        let Some(project) = self.projects.iter_mut().find(|p| p.id == id) else {
            return;
        };
        if let Some(name) = patch.name {
            project.name = name;
        }
        if let Some(description) = patch.description {
            project.description = description;
        }
        if let Some(color) = patch.color {
            project.color = color;
        }
        self.touch();
    }

    /// Remove a project and every task in it; if it was selected, selection
    /// falls back to "all projects".
    pub fn delete_project(&mut self, id: &str) {
        let before = self.projects.len() + self.tasks.len();
        self.projects.retain(|p| p.id != id);
        self.tasks.retain(|t| t.project_id != id);
        if self.selected_project_id.as_deref() == Some(id) {
            self.selected_project_id = None;
        }
        if self.projects.len() + self.tasks.len() != before {
            self.touch();
        }
    }

    /// `None` means "show all projects"
    pub fn set_selected_project(&mut self, id: Option<String>) {
        self.selected_project_id = id;
        self.touch();
    }

    // -----------------------------------------------------------------------
    // Profile
    // -----------------------------------------------------------------------

    pub fn update_user_profile(&mut self, patch: ProfilePatch) {
        if let Some(name) = patch.name {
            self.user_profile.name = name;
        }
        if let Some(email) = patch.email {
            self.user_profile.email = email;
        }
        if let Some(role) = patch.role {
            self.user_profile.role = role;
        }
        if let Some(avatar) = patch.avatar {
            self.user_profile.avatar = avatar;
        }
        self.touch();
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn fresh_task_id(&self) -> String {
        loop {
            let id = format!("task-{}", Uuid::new_v4());
            if self.task(&id).is_none() {
                return id;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::io::snapshot::MemoryBackend;
    use crate::store::clock::ManualClock;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    pub(crate) fn test_clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 8, 1, 9, 0, 0).unwrap(),
        ))
    }

    pub(crate) fn sample_store() -> Store {
        Store::with_defaults(test_clock())
    }

    pub(crate) fn new_task(title: &str, column_id: &str, order: u32) -> NewTask {
        NewTask {
            title: title.to_string(),
            description: String::new(),
            priority: Priority::None,
            column_id: column_id.to_string(),
            project_id: "default".to_string(),
            order,
            due_date: None,
        }
    }

    // --- Defaults ---

    #[test]
    fn with_defaults_seeds_board() {
        let store = sample_store();
        let ids: Vec<&str> = store.columns.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["todo", "in-progress", "done"]);
        assert_eq!(store.projects.len(), 1);
        assert_eq!(store.projects[0].id, "default");
        assert_eq!(store.selected_project_id.as_deref(), Some("default"));
        assert_eq!(store.user_profile.name, "User");
        assert!(store.tasks.is_empty());
    }

    // --- Task CRUD ---

    #[test]
    fn add_task_seeds_fields_and_created_entry() {
        let mut store = sample_store();
        let mut input = new_task("X", "todo", 2);
        input.priority = Priority::High;
        let id = store.add_task(input).unwrap();

        let task = store.task(&id).unwrap();
        assert!(!task.is_completed);
        assert_eq!(task.time_spent, 0);
        assert!(!task.is_timer_running);
        assert!(task.last_timer_start.is_none());
        assert!(task.completed_at.is_none());
        assert!(task.tags.is_empty());
        assert!(task.dependencies.is_empty());
        assert_eq!(task.order, 2);
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.activity_log.len(), 1);
        assert_eq!(task.activity_log[0].action, Activity::Created);
    }

    #[test]
    fn add_task_rejects_empty_title() {
        let mut store = sample_store();
        assert!(matches!(
            store.add_task(new_task("", "todo", 0)),
            Err(StoreError::EmptyTitle)
        ));
        assert!(matches!(
            store.add_task(new_task("   ", "todo", 0)),
            Err(StoreError::EmptyTitle)
        ));
        assert!(store.tasks.is_empty());
    }

    #[test]
    fn add_task_ids_are_unique() {
        let mut store = sample_store();
        let a = store.add_task(new_task("A", "todo", 0)).unwrap();
        let b = store.add_task(new_task("B", "todo", 1)).unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("task-"));
    }

    #[test]
    fn update_task_merges_patch() {
        let mut store = sample_store();
        let id = store.add_task(new_task("Old", "todo", 0)).unwrap();
        let due = Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap();

        store.update_task(
            &id,
            TaskPatch {
                title: Some("New".into()),
                priority: Some(Priority::Low),
                due_date: Some(Some(due)),
                ..Default::default()
            },
        );

        let task = store.task(&id).unwrap();
        assert_eq!(task.title, "New");
        assert_eq!(task.priority, Priority::Low);
        assert_eq!(task.due_date, Some(due));
        // Untouched fields survive
        assert_eq!(task.column_id, "todo");
        // The edit path does not log activity
        assert_eq!(task.activity_log.len(), 1);
    }

    #[test]
    fn update_task_can_clear_due_date() {
        let mut store = sample_store();
        let due = Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap();
        let mut input = new_task("T", "todo", 0);
        input.due_date = Some(due);
        let id = store.add_task(input).unwrap();

        store.update_task(
            &id,
            TaskPatch {
                due_date: Some(None),
                ..Default::default()
            },
        );
        assert!(store.task(&id).unwrap().due_date.is_none());
    }

    #[test]
    fn update_task_unknown_id_is_noop() {
        let mut store = sample_store();
        store.add_task(new_task("T", "todo", 0)).unwrap();
        let before = store.tasks.clone();
        store.update_task(
            "task-missing",
            TaskPatch {
                title: Some("X".into()),
                ..Default::default()
            },
        );
        assert_eq!(store.tasks, before);
    }

    #[test]
    fn delete_task_leaves_sibling_orders_alone() {
        let mut store = sample_store();
        store.add_task(new_task("A", "todo", 0)).unwrap();
        let b = store.add_task(new_task("B", "todo", 1)).unwrap();
        store.add_task(new_task("C", "todo", 2)).unwrap();

        store.delete_task(&b);

        let orders: Vec<u32> = store.tasks_in_column("todo").iter().map(|t| t.order).collect();
        assert_eq!(orders, vec![0, 2]); // gap stays open
    }

    #[test]
    fn add_activity_appends_custom_entry() {
        let mut store = sample_store();
        let id = store.add_task(new_task("T", "todo", 0)).unwrap();
        store.add_activity(
            &id,
            Activity::Custom("commented".into()),
            Some("looks good".into()),
        );

        let log = &store.task(&id).unwrap().activity_log;
        assert_eq!(log.len(), 2);
        assert_eq!(log[1].action, Activity::Custom("commented".into()));
        assert_eq!(log[1].details.as_deref(), Some("looks good"));
    }

    // --- Column CRUD ---

    #[test]
    fn add_column_goes_last() {
        let mut store = sample_store();
        let id = store.add_column("Review".into());
        let col = store.column(&id).unwrap();
        assert_eq!(col.order, 3);
        assert_eq!(col.title, "Review");
    }

    #[test]
    fn delete_column_cascades_to_its_tasks_only() {
        let mut store = sample_store();
        let a = store.add_task(new_task("A", "todo", 0)).unwrap();
        let b = store.add_task(new_task("B", "in-progress", 0)).unwrap();

        store.delete_column("todo");

        assert!(store.column("todo").is_none());
        assert!(store.task(&a).is_none());
        assert!(store.task(&b).is_some());
    }

    // --- Project CRUD ---

    #[test]
    fn project_crud_round_trip() {
        let mut store = sample_store();
        let id = store.add_project(NewProject {
            name: "Side quest".into(),
            description: None,
            color: "#ff0000".into(),
        });
        assert!(id.starts_with("project-"));

        store.update_project(
            &id,
            ProjectPatch {
                name: Some("Main quest".into()),
                description: Some(Some("the real work".into())),
                ..Default::default()
            },
        );
        let project = store.project(&id).unwrap();
        assert_eq!(project.name, "Main quest");
        assert_eq!(project.description.as_deref(), Some("the real work"));
        assert_eq!(project.color, "#ff0000");
    }

    #[test]
    fn delete_project_cascades_and_resets_selection() {
        let mut store = sample_store();
        let id = store.add_project(NewProject {
            name: "P".into(),
            description: None,
            color: "#000".into(),
        });
        let mut input = new_task("T", "todo", 0);
        input.project_id = id.clone();
        let task_id = store.add_task(input).unwrap();
        let keep = store.add_task(new_task("K", "todo", 1)).unwrap();
        store.set_selected_project(Some(id.clone()));

        store.delete_project(&id);

        assert!(store.project(&id).is_none());
        assert!(store.task(&task_id).is_none());
        assert!(store.task(&keep).is_some());
        assert_eq!(store.selected_project_id, None);
    }

    #[test]
    fn delete_unselected_project_keeps_selection() {
        let mut store = sample_store();
        let id = store.add_project(NewProject {
            name: "P".into(),
            description: None,
            color: "#000".into(),
        });
        store.delete_project(&id);
        assert_eq!(store.selected_project_id.as_deref(), Some("default"));
    }

    // --- Profile ---

    #[test]
    fn update_profile_merges() {
        let mut store = sample_store();
        store.update_user_profile(ProfilePatch {
            name: Some("Ada".into()),
            avatar: Some(Some("ada.png".into())),
            ..Default::default()
        });
        assert_eq!(store.user_profile.name, "Ada");
        assert_eq!(store.user_profile.email, "user@taskflow.com");
        assert_eq!(store.user_profile.avatar.as_deref(), Some("ada.png"));
    }

    // --- Persistence notifications ---

    #[test]
    fn every_mutation_notifies_backend() {
        let backend = MemoryBackend::default();
        let mut store = sample_store();
        store.set_backend(Box::new(backend.clone()));

        let id = store.add_task(new_task("T", "todo", 0)).unwrap();
        store.update_task(
            &id,
            TaskPatch {
                title: Some("T2".into()),
                ..Default::default()
            },
        );
        store.delete_task(&id);

        assert_eq!(backend.persist_count(), 3);
        // Last snapshot reflects the delete
        assert!(backend.last().unwrap().tasks.is_empty());
    }

    #[test]
    fn noop_mutations_do_not_notify_backend() {
        let backend = MemoryBackend::default();
        let mut store = sample_store();
        store.set_backend(Box::new(backend.clone()));

        store.delete_task("task-missing");
        store.update_task("task-missing", TaskPatch::default());
        store.delete_column("no-such-column");
        store.delete_project("no-such-project");

        assert_eq!(backend.persist_count(), 0);
    }

    #[test]
    fn open_rehydrates_from_backend() {
        let backend = MemoryBackend::default();
        let mut store = sample_store();
        store.set_backend(Box::new(backend.clone()));
        let id = store.add_task(new_task("Persisted", "todo", 0)).unwrap();
        drop(store);

        let reopened = Store::open(Box::new(backend), test_clock()).unwrap();
        assert_eq!(reopened.task(&id).unwrap().title, "Persisted");
    }

    #[test]
    fn open_without_snapshot_starts_fresh() {
        let store = Store::open(Box::new(MemoryBackend::default()), test_clock()).unwrap();
        assert_eq!(store.columns.len(), 3);
        assert_eq!(store.selected_project_id.as_deref(), Some("default"));
    }
}
