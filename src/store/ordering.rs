//! Per-column ordering under move, reorder, and delete.
//!
//! Two tiers on purpose: [`move_task`] is the cheap local shift used for a
//! cross-column drop, [`reorder_tasks`] is the ground-truth densify used
//! after a same-column drag. Moves leave gaps in the source column; gaps are
//! tolerated everywhere and only a reorder closes them.

use crate::store::Store;

/// Put a task into `new_column_id` at `new_order`.
///
/// Every other task already in the destination whose order is at or past
/// the insertion point shifts one slot (`order += 1`) to make room. The
/// source column is left untouched, gap and all. Unknown task id: no-op.
pub fn move_task(store: &mut Store, task_id: &str, new_column_id: &str, new_order: u32) {
    if store.task(task_id).is_none() {
        return;
    }
    for task in &mut store.tasks {
        if task.id == task_id {
            task.column_id = new_column_id.to_string();
            task.order = new_order;
        } else if task.column_id == new_column_id && task.order >= new_order {
            task.order += 1;
        }
    }
    store.touch();
}

/// Re-lay-out one column: each task whose id appears in `ordered_ids` gets
/// its index as its `order`, dense from 0. Tasks of the column missing from
/// the sequence, and tasks of other columns, are untouched.
pub fn reorder_tasks(store: &mut Store, column_id: &str, ordered_ids: &[String]) {
    let mut changed = false;
    for task in &mut store.tasks {
        if task.column_id != column_id {
            continue;
        }
        if let Some(index) = ordered_ids.iter().position(|id| *id == task.id) {
            task.order = index as u32;
            changed = true;
        }
    }
    if changed {
        store.touch();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
