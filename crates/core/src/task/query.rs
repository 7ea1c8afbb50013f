//! View preference types and the list query built from them

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::model::{TaskRecord, TaskStatus};
use crate::{Error, Result};

/// Status filter applied to the task list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskFilter {
    All,
    Pending,
    InProgress,
    Completed,
}

impl Default for TaskFilter {
    fn default() -> Self {
        Self::All
    }
}

impl TaskFilter {
    /// The status constraint this filter stands for, `None` for `all`
    pub fn status(&self) -> Option<TaskStatus> {
        match self {
            Self::All => None,
            Self::Pending => Some(TaskStatus::Pending),
            Self::InProgress => Some(TaskStatus::InProgress),
            Self::Completed => Some(TaskStatus::Completed),
        }
    }

    pub fn matches(&self, status: TaskStatus) -> bool {
        self.status().map_or(true, |s| s == status)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl std::str::FromStr for TaskFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(Self::All),
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(Error::InvalidInput(format!("Unknown filter: {other}"))),
        }
    }
}

/// Field the task list is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    DueDate,
    PlannedCompletionDate,
    Title,
    CreatedAt,
    UpdatedAt,
}

impl Default for SortBy {
    fn default() -> Self {
        Self::DueDate
    }
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DueDate => "due_date",
            Self::PlannedCompletionDate => "planned_completion_date",
            Self::Title => "title",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

impl std::str::FromStr for SortBy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "due_date" => Ok(Self::DueDate),
            "planned_completion_date" => Ok(Self::PlannedCompletionDate),
            "title" => Ok(Self::Title),
            "created_at" => Ok(Self::CreatedAt),
            "updated_at" => Ok(Self::UpdatedAt),
            other => Err(Error::InvalidInput(format!("Unknown sort field: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl Default for SortOrder {
    fn default() -> Self {
        Self::Asc
    }
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(Error::InvalidInput(format!("Unknown sort order: {other}"))),
        }
    }
}

/// Query sent to the remote API when listing tasks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
}

impl TaskQuery {
    pub fn new(filter: TaskFilter, sort_by: SortBy, sort_order: SortOrder) -> Self {
        Self {
            status: filter.status(),
            sort_by,
            sort_order,
        }
    }
}

/// Stable in-place sort of tasks by the given key
///
/// Tasks without a value for a date key go last in both directions.
pub fn sort_tasks(tasks: &mut [TaskRecord], sort_by: SortBy, sort_order: SortOrder) {
    tasks.sort_by(|a, b| {
        let ordering = match sort_by {
            SortBy::DueDate => return cmp_optional(a.due_date, b.due_date, sort_order),
            SortBy::PlannedCompletionDate => {
                return cmp_optional(
                    a.planned_completion_date,
                    b.planned_completion_date,
                    sort_order,
                )
            }
            SortBy::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortBy::CreatedAt => a.created_at.cmp(&b.created_at),
            SortBy::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        };
        directed(ordering, sort_order)
    });
}

fn cmp_optional<T: Ord>(a: Option<T>, b: Option<T>, order: SortOrder) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => directed(a.cmp(&b), order),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn directed(ordering: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(TaskFilter::default(), TaskFilter::All);
        assert_eq!(SortBy::default(), SortBy::DueDate);
        assert_eq!(SortOrder::default(), SortOrder::Asc);
    }

    #[test]
    fn test_filter_all_has_no_status() {
        let query = TaskQuery::new(TaskFilter::All, SortBy::Title, SortOrder::Desc);
        assert!(query.status.is_none());

        let value = serde_json::to_value(query).unwrap();
        assert!(value.get("status").is_none());
        assert_eq!(value["sort_by"], "title");
        assert_eq!(value["sort_order"], "desc");
    }

    #[test]
    fn test_filter_matches() {
        assert!(TaskFilter::All.matches(TaskStatus::Completed));
        assert!(TaskFilter::InProgress.matches(TaskStatus::InProgress));
        assert!(!TaskFilter::Pending.matches(TaskStatus::Completed));
    }

    #[test]
    fn test_parse_preferences() {
        assert_eq!("in_progress".parse::<TaskFilter>().unwrap(), TaskFilter::InProgress);
        assert_eq!(
            "planned_completion_date".parse::<SortBy>().unwrap(),
            SortBy::PlannedCompletionDate
        );
        assert_eq!("desc".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert!("sideways".parse::<SortOrder>().is_err());
    }

    fn dated(id: i64, title: &str, due: Option<(i32, u32, u32)>) -> TaskRecord {
        let mut task = TaskRecord::new(id, title);
        task.due_date = due.and_then(|(y, m, d)| chrono::NaiveDate::from_ymd_opt(y, m, d));
        task
    }

    fn ids(tasks: &[TaskRecord]) -> Vec<i64> {
        tasks.iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_sort_by_due_date_missing_last() {
        let mut tasks = vec![
            dated(1, "a", None),
            dated(2, "b", Some((2024, 3, 1))),
            dated(3, "c", Some((2024, 1, 1))),
        ];

        sort_tasks(&mut tasks, SortBy::DueDate, SortOrder::Asc);
        assert_eq!(ids(&tasks), vec![3, 2, 1]);

        sort_tasks(&mut tasks, SortBy::DueDate, SortOrder::Desc);
        assert_eq!(ids(&tasks), vec![2, 3, 1]);
    }

    #[test]
    fn test_sort_by_title_ignores_case() {
        let mut tasks = vec![
            dated(1, "banana", None),
            dated(2, "Apple", None),
            dated(3, "cherry", None),
        ];
        sort_tasks(&mut tasks, SortBy::Title, SortOrder::Asc);
        assert_eq!(ids(&tasks), vec![2, 1, 3]);
    }

    #[test]
    fn test_wire_names_match_as_str() {
        for by in [
            SortBy::DueDate,
            SortBy::PlannedCompletionDate,
            SortBy::Title,
            SortBy::CreatedAt,
            SortBy::UpdatedAt,
        ] {
            assert_eq!(serde_json::to_value(by).unwrap(), by.as_str());
        }
        assert_eq!(serde_json::to_value(TaskFilter::InProgress).unwrap(), "in_progress");
    }
}
