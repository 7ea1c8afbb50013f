//! Subcommands and their execution against the task controller

use anyhow::{anyhow, Result};
use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Subcommand};
use std::io::Write;

use mat_core::store::AppState;
use mat_core::task::{SortBy, SortOrder, TaskDraft, TaskFilter, TaskStatus};
use mat_core::view::TaskController;

use crate::render;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch and print the task list
    List {
        /// Print the full state as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one task in detail
    Show { id: i64 },
    /// Create a task
    Add {
        #[arg(long)]
        title: String,
        #[command(flatten)]
        fields: TaskFields,
    },
    /// Edit a task; only the given fields change
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[command(flatten)]
        fields: TaskFields,
    },
    /// Change a task's status
    Status { id: i64, status: TaskStatus },
    /// Delete a task
    Delete { id: i64 },
    /// Set the status filter (all, pending, in_progress, completed)
    Filter { filter: TaskFilter },
    /// Set the sort field and direction
    Sort { by: SortBy, order: SortOrder },
    /// Print the saved view preferences
    Prefs,
}

#[derive(Args, Debug, Default)]
pub struct TaskFields {
    #[arg(long)]
    pub description: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub due_date: Option<NaiveDate>,
    /// HH:MM
    #[arg(long, value_parser = parse_time)]
    pub due_time: Option<NaiveTime>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub planned: Option<NaiveDate>,
    /// Hours
    #[arg(long)]
    pub estimate: Option<f64>,
    #[arg(long)]
    pub status: Option<TaskStatus>,
}

impl TaskFields {
    /// Overlay the given fields onto a draft
    pub fn apply(self, draft: &mut TaskDraft) {
        if let Some(description) = self.description {
            draft.description = Some(description);
        }
        if let Some(due_date) = self.due_date {
            draft.due_date = Some(due_date);
        }
        if let Some(due_time) = self.due_time {
            draft.due_time = Some(due_time);
        }
        if let Some(planned) = self.planned {
            draft.planned_completion_date = Some(planned);
        }
        if let Some(estimate) = self.estimate {
            draft.estimated_finish_time = Some(estimate);
        }
        if let Some(status) = self.status {
            draft.status = status;
        }
    }
}

fn parse_time(raw: &str) -> std::result::Result<NaiveTime, String> {
    NaiveTime::parse_from_str(raw, "%H:%M").map_err(|e| format!("expected HH:MM: {e}"))
}

/// Run one command and print its outcome
pub async fn run(
    command: Command,
    controller: &TaskController,
    out: &mut impl Write,
) -> Result<()> {
    let store = controller.store();
    match command {
        Command::List { json } => {
            controller.refresh().await;
            let state = store.snapshot().await;
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&state)?)?;
            } else {
                print_outcome(&state, out)?;
            }
        }
        Command::Show { id } => {
            controller.open_edit(id).await;
            let task = controller.load_edit_target().await;
            controller.cancel_edit().await;
            match task {
                Some(task) => writeln!(out, "{}", render::task_details(&task))?,
                None => print_messages(&store.snapshot().await, out)?,
            }
        }
        Command::Add { title, fields } => {
            let mut draft = TaskDraft::new(title);
            fields.apply(&mut draft);
            controller.open_create().await;
            if !controller.submit_create(draft).await {
                controller.cancel_create().await;
            }
            print_outcome(&store.snapshot().await, out)?;
        }
        Command::Edit { id, title, fields } => {
            controller.open_edit(id).await;
            if let Some(task) = controller.load_edit_target().await {
                let mut draft = TaskDraft::from(&task);
                if let Some(title) = title {
                    draft.title = title;
                }
                fields.apply(&mut draft);
                controller.submit_edit(draft).await;
            }
            controller.cancel_edit().await;
            print_outcome(&store.snapshot().await, out)?;
        }
        Command::Status { id, status } => {
            controller.quick_status(id, status).await;
            print_outcome(&store.snapshot().await, out)?;
        }
        Command::Delete { id } => {
            let title = store
                .tasks()
                .await
                .into_iter()
                .find(|t| t.id == id)
                .map(|t| t.title)
                .unwrap_or_else(|| format!("task {}", id));
            controller.request_delete(id, title).await;
            if !controller.confirm_delete().await {
                controller.cancel_delete().await;
            }
            print_outcome(&store.snapshot().await, out)?;
        }
        Command::Filter { filter } => {
            controller.change_filter(filter).await;
            print_outcome(&store.snapshot().await, out)?;
        }
        Command::Sort { by, order } => {
            controller.change_sort(by, order).await;
            print_outcome(&store.snapshot().await, out)?;
        }
        Command::Prefs => {
            let prefs = store.preferences().await;
            writeln!(
                out,
                "filter: {}\nsort_by: {}\nsort_order: {}",
                prefs.filter.as_str(),
                prefs.sort_by.as_str(),
                prefs.sort_order.as_str()
            )?;
        }
    }

    if let Some(error) = store.error().await {
        return Err(anyhow!(error));
    }
    Ok(())
}

fn print_messages(state: &AppState, out: &mut impl Write) -> Result<()> {
    if let Some(line) = render::notification(&state.notification) {
        writeln!(out, "{}", line)?;
    } else if let Some(error) = &state.error {
        writeln!(out, "error: {}", error)?;
    }
    Ok(())
}

fn print_outcome(state: &AppState, out: &mut impl Write) -> Result<()> {
    print_messages(state, out)?;
    writeln!(out, "{}", render::task_list(state))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mat_core::store::{AppStore, FileStateStorage, StoreConfig};
    use mat_core::task::InMemoryTaskApi;
    use std::sync::Arc;
    use tempfile::TempDir;

    async fn controller(dir: &TempDir) -> TaskController {
        let storage = Arc::new(FileStateStorage::new(dir.path()));
        let store = AppStore::load(storage, StoreConfig::default()).await.unwrap();
        TaskController::new(store, Arc::new(InMemoryTaskApi::new()))
    }

    async fn run_to_string(command: Command, controller: &TaskController) -> (Result<()>, String) {
        let mut out = Vec::new();
        let result = run(command, controller, &mut out).await;
        (result, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn test_add_then_list() {
        let dir = TempDir::new().unwrap();
        let controller = controller(&dir).await;

        let fields = TaskFields {
            due_date: NaiveDate::from_ymd_opt(2024, 7, 1),
            ..TaskFields::default()
        };
        let (result, output) = run_to_string(
            Command::Add {
                title: "Renew passport".to_string(),
                fields,
            },
            &controller,
        )
        .await;
        assert!(result.is_ok());
        assert!(output.contains("ok: Task created successfully!"));
        assert!(output.contains("Renew passport  due 2024-07-01"));
    }

    #[tokio::test]
    async fn test_edit_overlays_fields() {
        let dir = TempDir::new().unwrap();
        let controller = controller(&dir).await;
        run_to_string(
            Command::Add {
                title: "Draft".to_string(),
                fields: TaskFields::default(),
            },
            &controller,
        )
        .await
        .0
        .unwrap();

        let fields = TaskFields {
            status: Some(TaskStatus::InProgress),
            ..TaskFields::default()
        };
        let (result, output) = run_to_string(
            Command::Edit {
                id: 1,
                title: None,
                fields,
            },
            &controller,
        )
        .await;
        assert!(result.is_ok());
        assert!(output.contains("[~] Draft"));
        assert!(controller.store().active_modal_data().await.task_id_for_edit.is_none());
    }

    #[tokio::test]
    async fn test_invalid_add_reports_error() {
        let dir = TempDir::new().unwrap();
        let controller = controller(&dir).await;

        let (result, output) = run_to_string(
            Command::Add {
                title: " ".to_string(),
                fields: TaskFields::default(),
            },
            &controller,
        )
        .await;
        assert!(result.is_err());
        assert!(output.contains("Title is required"));
        assert!(!controller.store().modal_visibility().await.task_creation);
    }

    #[tokio::test]
    async fn test_filter_is_saved() {
        let dir = TempDir::new().unwrap();
        {
            let controller = controller(&dir).await;
            run_to_string(Command::Filter { filter: TaskFilter::Completed }, &controller)
                .await
                .0
                .unwrap();
            controller.store().save().await.unwrap();
        }

        let controller = controller(&dir).await;
        let (_, output) = run_to_string(Command::Prefs, &controller).await;
        assert!(output.contains("filter: completed"));
    }

    #[tokio::test]
    async fn test_json_list_reports_fetch_failure() {
        let dir = TempDir::new().unwrap();
        let storage = Arc::new(FileStateStorage::new(dir.path()));
        let store = AppStore::load(storage, StoreConfig::default()).await.unwrap();
        let api = Arc::new(InMemoryTaskApi::new());
        api.set_unavailable(true);
        let controller = TaskController::new(store, api);

        let (result, output) = run_to_string(Command::List { json: true }, &controller).await;
        assert!(result.is_err());
        let state: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert!(state["error"]
            .as_str()
            .unwrap()
            .starts_with("Failed to load tasks"));
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("07:45").unwrap(), NaiveTime::from_hms_opt(7, 45, 0).unwrap());
        assert!(parse_time("7pm").is_err());
    }
}
