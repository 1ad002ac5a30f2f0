use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::model::column::Column;
use crate::model::profile::UserProfile;
use crate::model::project::Project;
use crate::model::task::Task;

/// The fixed key the whole board persists under.
///
/// The file backend uses it as the snapshot's file stem, matching the
/// storage key of snapshots written by earlier front ends.
pub const STORAGE_KEY: &str = "taskflow-storage";

/// Error type for snapshot persistence
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("could not read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("malformed snapshot {path}: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// The complete persisted state: one JSON document holding every collection.
///
/// Field names are camelCase on the wire; all collections default to empty
/// so a truncated-but-valid document still loads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub selected_project_id: Option<String>,
    #[serde(default)]
    pub user_profile: UserProfile,
}

/// Where snapshots go. The store notifies its backend after every
/// successful mutation; `load` feeds rehydration at startup.
pub trait SnapshotBackend {
    /// `Ok(None)` means no snapshot exists yet (first run).
    fn load(&self) -> Result<Option<Snapshot>, SnapshotError>;
    fn persist(&mut self, snapshot: &Snapshot) -> Result<(), SnapshotError>;
}

// ---------------------------------------------------------------------------
// Atomic file write
// ---------------------------------------------------------------------------

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// File backend
// ---------------------------------------------------------------------------

/// Snapshot file on disk, written atomically.
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: PathBuf) -> Self {
        FileBackend { path }
    }

    /// The conventional location inside a data directory:
    /// `<dir>/taskflow-storage.json`.
    pub fn in_dir(dir: &Path) -> Self {
        FileBackend {
            path: dir.join(format!("{}.json", STORAGE_KEY)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotBackend for FileBackend {
    fn load(&self) -> Result<Option<Snapshot>, SnapshotError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(SnapshotError::Read {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };
        let snapshot = serde_json::from_str(&content).map_err(|e| SnapshotError::Malformed {
            path: self.path.clone(),
            source: e,
        })?;
        Ok(Some(snapshot))
    }

    fn persist(&mut self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        let content = serde_json::to_string_pretty(snapshot).map_err(|e| {
            SnapshotError::Malformed {
                path: self.path.clone(),
                source: e,
            }
        })?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| SnapshotError::Write {
                path: self.path.clone(),
                source: e,
            })?;
        }
        atomic_write(&self.path, content.as_bytes()).map_err(|e| SnapshotError::Write {
            path: self.path.clone(),
            source: e,
        })
    }
}

// ---------------------------------------------------------------------------
// Memory backend
// ---------------------------------------------------------------------------

/// In-memory backend for tests. Clones share the underlying buffer, so a
/// test can keep a handle while the store owns the boxed backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    saved: Arc<Mutex<Vec<Snapshot>>>,
}

impl MemoryBackend {
    /// A backend that already holds a snapshot (simulates a prior run)
    pub fn preloaded(snapshot: Snapshot) -> Self {
        MemoryBackend {
            saved: Arc::new(Mutex::new(vec![snapshot])),
        }
    }

    /// How many times the store has persisted since construction
    pub fn persist_count(&self) -> usize {
        self.saved.lock().unwrap().len()
    }

    /// The most recently persisted snapshot
    pub fn last(&self) -> Option<Snapshot> {
        self.saved.lock().unwrap().last().cloned()
    }
}

impl SnapshotBackend for MemoryBackend {
    fn load(&self) -> Result<Option<Snapshot>, SnapshotError> {
        Ok(self.saved.lock().unwrap().last().cloned())
    }

    fn persist(&mut self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        self.saved.lock().unwrap().push(snapshot.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::{Activity, ActivityEntry, Priority};
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn sample_snapshot() -> Snapshot {
        let now = Utc.with_ymd_and_hms(2026, 8, 1, 9, 0, 0).unwrap();
        Snapshot {
            tasks: vec![Task {
                id: "task-1".into(),
                title: "Ship it".into(),
                description: "the whole thing".into(),
                priority: Priority::Medium,
                column_id: "todo".into(),
                project_id: "default".into(),
                order: 0,
                created_at: now,
                due_date: Some(now + chrono::Duration::days(3)),
                is_completed: false,
                completed_at: None,
                time_spent: 42,
                is_timer_running: false,
                last_timer_start: None,
                activity_log: vec![ActivityEntry::new(Activity::Created, now)],
                tags: vec!["launch".into()],
                dependencies: Vec::new(),
            }],
            columns: Column::defaults(),
            projects: vec![Project::default_project(now)],
            selected_project_id: Some("default".into()),
            user_profile: UserProfile::default(),
        }
    }

    #[test]
    fn file_backend_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut backend = FileBackend::in_dir(dir.path());
        let snapshot = sample_snapshot();

        backend.persist(&snapshot).unwrap();
        let loaded = backend.load().unwrap().unwrap();

        assert_eq!(loaded.tasks, snapshot.tasks);
        assert_eq!(loaded.columns.len(), 3);
        assert_eq!(loaded.selected_project_id.as_deref(), Some("default"));
        assert_eq!(loaded.user_profile.email, "user@taskflow.com");
    }

    #[test]
    fn file_backend_uses_storage_key_as_stem() {
        let dir = TempDir::new().unwrap();
        let mut backend = FileBackend::in_dir(dir.path());
        backend.persist(&sample_snapshot()).unwrap();
        assert!(dir.path().join("taskflow-storage.json").exists());
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = TempDir::new().unwrap();
        let backend = FileBackend::in_dir(dir.path());
        assert!(backend.load().unwrap().is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("taskflow-storage.json");
        fs::write(&path, "not json {{{").unwrap();

        let backend = FileBackend::new(path);
        assert!(matches!(
            backend.load(),
            Err(SnapshotError::Malformed { .. })
        ));
    }

    #[test]
    fn wire_format_keeps_camel_case_names() {
        let dir = TempDir::new().unwrap();
        let mut backend = FileBackend::in_dir(dir.path());
        backend.persist(&sample_snapshot()).unwrap();

        let raw = fs::read_to_string(dir.path().join("taskflow-storage.json")).unwrap();
        for field in [
            "\"selectedProjectId\"",
            "\"userProfile\"",
            "\"columnId\"",
            "\"projectId\"",
            "\"createdAt\"",
            "\"dueDate\"",
            "\"timeSpent\"",
            "\"isTimerRunning\"",
            "\"activityLog\"",
        ] {
            assert!(raw.contains(field), "missing {} in snapshot", field);
        }
    }

    #[test]
    fn minimal_document_fills_defaults() {
        let snapshot: Snapshot = serde_json::from_str("{}").unwrap();
        assert!(snapshot.tasks.is_empty());
        assert!(snapshot.columns.is_empty());
        assert!(snapshot.selected_project_id.is_none());
        assert_eq!(snapshot.user_profile.name, "User");
    }

    #[test]
    fn preloaded_backend_serves_its_snapshot() {
        let backend = MemoryBackend::preloaded(sample_snapshot());
        let loaded = backend.load().unwrap().unwrap();
        assert_eq!(loaded.tasks.len(), 1);
        assert_eq!(loaded.tasks[0].title, "Ship it");
    }

    #[test]
    fn memory_backend_counts_persists() {
        let handle = MemoryBackend::default();
        let mut backend = handle.clone();
        assert!(backend.load().unwrap().is_none());

        backend.persist(&sample_snapshot()).unwrap();
        backend.persist(&sample_snapshot()).unwrap();

        assert_eq!(handle.persist_count(), 2);
        assert!(handle.last().is_some());
    }
}
