//! Plain-text rendering of the store state

use mat_core::store::{AppState, Notification, NotificationKind};
use mat_core::task::{TaskRecord, TaskStatus};
use mat_core::view::{list::count_by_status, visible_tasks};

pub fn status_label(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "[ ]",
        TaskStatus::InProgress => "[~]",
        TaskStatus::Completed => "[x]",
    }
}

pub fn task_line(task: &TaskRecord) -> String {
    let mut line = format!("{:>4} {} {}", task.id, status_label(task.status), task.title);
    if let Some(due) = task.due_date {
        line.push_str(&format!("  due {}", due.format("%Y-%m-%d")));
        if let Some(time) = task.due_time {
            line.push_str(&format!(" {}", time.format("%H:%M")));
        }
    }
    if let Some(hours) = task.estimated_finish_time {
        line.push_str(&format!("  ~{}h", hours));
    }
    line
}

pub fn task_details(task: &TaskRecord) -> String {
    let mut out = vec![
        format!("#{} {}", task.id, task.title),
        format!("status:     {}", task.status),
    ];
    if let Some(description) = &task.description {
        out.push(format!("details:    {}", description));
    }
    if let Some(due) = task.due_date {
        out.push(format!("due:        {}", due.format("%Y-%m-%d")));
    }
    if let Some(time) = task.due_time {
        out.push(format!("due time:   {}", time.format("%H:%M")));
    }
    if let Some(planned) = task.planned_completion_date {
        out.push(format!("planned:    {}", planned.format("%Y-%m-%d")));
    }
    if let Some(hours) = task.estimated_finish_time {
        out.push(format!("estimate:   {}h", hours));
    }
    out.push(format!("created:    {}", task.created_at.to_rfc3339()));
    out.push(format!("updated:    {}", task.updated_at.to_rfc3339()));
    out.join("\n")
}

pub fn task_list(state: &AppState) -> String {
    let prefs = state.preferences();
    let visible = visible_tasks(&state.tasks, &prefs);

    let mut out = vec![format!(
        "filter: {}  sort: {} {}  ({} pending, {} in progress, {} completed)",
        prefs.filter.as_str(),
        prefs.sort_by.as_str(),
        prefs.sort_order.as_str(),
        count_by_status(&state.tasks, TaskStatus::Pending),
        count_by_status(&state.tasks, TaskStatus::InProgress),
        count_by_status(&state.tasks, TaskStatus::Completed),
    )];
    if visible.is_empty() {
        out.push("  no tasks".to_string());
    }
    out.extend(visible.iter().map(task_line));
    out.join("\n")
}

pub fn notification(notification: &Notification) -> Option<String> {
    let message = notification.message.as_ref()?;
    let prefix = match notification.kind {
        NotificationKind::Info => "info",
        NotificationKind::Success => "ok",
        NotificationKind::Warning => "warning",
        NotificationKind::Error => "error",
    };
    Some(format!("{}: {}", prefix, message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use mat_core::task::TaskFilter;

    #[test]
    fn test_task_line() {
        let mut task = TaskRecord::new(3, "Pay rent")
            .with_due_date(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        task.due_time = NaiveTime::from_hms_opt(9, 0, 0);
        task.estimated_finish_time = Some(0.5);
        assert_eq!(task_line(&task), "   3 [ ] Pay rent  due 2024-06-01 09:00  ~0.5h");
    }

    #[test]
    fn test_task_list_applies_filter() {
        let state = AppState {
            tasks: vec![
                TaskRecord::new(1, "open"),
                TaskRecord::new(2, "closed").with_status(TaskStatus::Completed),
            ],
            filter: TaskFilter::Completed,
            ..AppState::default()
        };
        let out = task_list(&state);
        assert!(out.contains("closed"));
        assert!(!out.contains("open"));
        assert!(out.contains("1 pending"));
    }

    #[test]
    fn test_notification_line() {
        assert_eq!(notification(&Notification::default()), None);
        assert_eq!(
            notification(&Notification::new("Saved", NotificationKind::Success)).as_deref(),
            Some("ok: Saved")
        );
    }
}
