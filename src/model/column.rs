use serde::{Deserialize, Serialize};

/// A kanban lane. `order` is the left-to-right position across the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: String,
    pub title: String,
    pub order: u32,
}

impl Column {
    /// The three lanes every fresh board starts with.
    ///
    /// Front ends conventionally refuse to delete these; the store itself
    /// does not treat them specially.
    pub fn defaults() -> Vec<Column> {
        vec![
            Column {
                id: "todo".to_string(),
                title: "To Do".to_string(),
                order: 0,
            },
            Column {
                id: "in-progress".to_string(),
                title: "In Progress".to_string(),
                order: 1,
            },
            Column {
                id: "done".to_string(),
                title: "Done".to_string(),
                order: 2,
            },
        ]
    }
}
