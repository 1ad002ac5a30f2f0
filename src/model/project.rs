use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named grouping of tasks with its own display color
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// The project a fresh board starts with (and selects).
    pub fn default_project(created_at: DateTime<Utc>) -> Project {
        Project {
            id: "default".to_string(),
            name: "Getting Started".to_string(),
            description: Some("Welcome to taskflow".to_string()),
            color: "#6366f1".to_string(),
            created_at,
        }
    }
}
