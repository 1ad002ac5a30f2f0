use serde::{Deserialize, Serialize};

/// The single user's profile. No lifecycle beyond field updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl Default for UserProfile {
    fn default() -> Self {
        UserProfile {
            name: "User".to_string(),
            email: "user@taskflow.com".to_string(),
            role: "Project Manager".to_string(),
            avatar: None,
        }
    }
}
