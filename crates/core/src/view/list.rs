//! Read-side derivation of the task list

use crate::store::ViewPreferences;
use crate::task::{sort_tasks, TaskRecord, TaskStatus};

/// Filter and order the cached tasks for display
pub fn visible_tasks(tasks: &[TaskRecord], prefs: &ViewPreferences) -> Vec<TaskRecord> {
    let mut visible: Vec<TaskRecord> = tasks
        .iter()
        .filter(|t| prefs.filter.matches(t.status))
        .cloned()
        .collect();
    sort_tasks(&mut visible, prefs.sort_by, prefs.sort_order);
    visible
}

/// Number of cached tasks in each status
pub fn count_by_status(tasks: &[TaskRecord], status: TaskStatus) -> usize {
    tasks.iter().filter(|t| t.status == status).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{SortBy, SortOrder, TaskFilter};

    fn tasks() -> Vec<TaskRecord> {
        vec![
            TaskRecord::new(1, "Water plants"),
            TaskRecord::new(2, "Answer email").with_status(TaskStatus::Completed),
            TaskRecord::new(3, "Book dentist").with_status(TaskStatus::InProgress),
            TaskRecord::new(4, "Call plumber"),
        ]
    }

    #[test]
    fn test_all_filter_keeps_everything() {
        let prefs = ViewPreferences {
            sort_by: SortBy::Title,
            ..ViewPreferences::default()
        };
        let ids: Vec<i64> = visible_tasks(&tasks(), &prefs).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 3, 4, 1]);
    }

    #[test]
    fn test_status_filter_and_desc_order() {
        let prefs = ViewPreferences {
            filter: TaskFilter::Pending,
            sort_by: SortBy::Title,
            sort_order: SortOrder::Desc,
        };
        let ids: Vec<i64> = visible_tasks(&tasks(), &prefs).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn test_count_by_status() {
        let tasks = tasks();
        assert_eq!(count_by_status(&tasks, TaskStatus::Pending), 2);
        assert_eq!(count_by_status(&tasks, TaskStatus::Completed), 1);
    }
}
