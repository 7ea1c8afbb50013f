//! Task view flows
//!
//! Each flow performs the API call a view would make and reports the
//! outcome through the store: `is_loading` around the call, `error` plus an
//! error notification on failure, a refreshed task list and a success
//! notification otherwise. Flows never return errors themselves.

use std::sync::Arc;
use tracing::{info, warn};

use crate::store::{ActiveModalDataPatch, AppStore, ModalName, NotificationKind};
use crate::task::{
    SortBy, SortOrder, TaskApi, TaskDraft, TaskFilter, TaskQuery, TaskRecord, TaskStatus,
};
use crate::{Error, Result};

pub const CREATED_MESSAGE: &str = "Task created successfully!";
pub const UPDATED_MESSAGE: &str = "Task updated successfully!";
pub const DELETED_MESSAGE: &str = "Task deleted successfully!";

/// Drives the list and modal views against a [`TaskApi`]
#[derive(Clone)]
pub struct TaskController {
    store: AppStore,
    api: Arc<dyn TaskApi>,
}

impl TaskController {
    pub fn new(store: AppStore, api: Arc<dyn TaskApi>) -> Self {
        Self { store, api }
    }

    pub fn store(&self) -> &AppStore {
        &self.store
    }

    // ---- List view ----

    /// Fetch the task list for the current preferences
    pub async fn refresh(&self) -> bool {
        let prefs = self.store.preferences().await;
        let query = TaskQuery::new(prefs.filter, prefs.sort_by, prefs.sort_order);

        self.store.set_loading(true).await;
        self.store.set_error(None).await;
        let result = self.api.list(&query).await;
        let ok = match result {
            Ok(tasks) => {
                self.store.set_tasks(tasks).await;
                true
            }
            Err(e) => {
                self.fail("Failed to load tasks", e).await;
                false
            }
        };
        self.store.set_loading(false).await;
        ok
    }

    pub async fn change_filter(&self, filter: TaskFilter) -> bool {
        self.store.set_filter(filter).await;
        self.refresh().await
    }

    pub async fn change_sort(&self, sort_by: SortBy, sort_order: SortOrder) -> bool {
        self.store.set_sort(sort_by, sort_order).await;
        self.refresh().await
    }

    /// Change a task's status straight from its list row
    pub async fn quick_status(&self, task_id: i64, status: TaskStatus) -> bool {
        let result = self.update_status(task_id, status).await;
        self.finish_mutation(result, "Failed to update task status", None, UPDATED_MESSAGE)
            .await
    }

    async fn update_status(&self, task_id: i64, status: TaskStatus) -> Result<TaskRecord> {
        self.store.set_loading(true).await;
        self.store.set_error(None).await;

        let cached = self
            .store
            .tasks()
            .await
            .into_iter()
            .find(|t| t.id == task_id);
        let task = match cached {
            Some(task) => task,
            None => self
                .api
                .get(task_id)
                .await?
                .ok_or(Error::TaskNotFound(task_id))?,
        };

        let mut draft = TaskDraft::from(&task);
        draft.status = status;
        self.api.update(task_id, draft).await
    }

    // ---- Creation modal ----

    pub async fn open_create(&self) {
        self.store.open_modal(ModalName::TaskCreation, None).await;
    }

    pub async fn cancel_create(&self) {
        self.store.close_modal(ModalName::TaskCreation).await;
    }

    pub async fn submit_create(&self, draft: TaskDraft) -> bool {
        let result = match draft.validate() {
            Ok(()) => {
                self.store.set_loading(true).await;
                self.store.set_error(None).await;
                self.api.create(draft).await
            }
            Err(e) => Err(e),
        };
        if let Ok(task) = &result {
            info!("Created task {}", task.id);
        }
        self.finish_mutation(
            result,
            "Failed to create task",
            Some(ModalName::TaskCreation),
            CREATED_MESSAGE,
        )
        .await
    }

    // ---- Edit modal ----

    pub async fn open_edit(&self, task_id: i64) {
        self.store
            .open_modal(ModalName::TaskEdit, Some(ActiveModalDataPatch::edit(task_id)))
            .await;
    }

    pub async fn cancel_edit(&self) {
        self.store.close_modal(ModalName::TaskEdit).await;
    }

    /// Fetch the record the open edit modal points at
    pub async fn load_edit_target(&self) -> Option<TaskRecord> {
        let Some(task_id) = self.store.active_modal_data().await.task_id_for_edit else {
            self.fail("Failed to load task", no_selection("editing")).await;
            return None;
        };

        self.store.set_loading(true).await;
        let result = match self.api.get(task_id).await {
            Ok(Some(task)) => Some(task),
            Ok(None) => {
                self.fail("Failed to load task", Error::TaskNotFound(task_id))
                    .await;
                None
            }
            Err(e) => {
                self.fail("Failed to load task", e).await;
                None
            }
        };
        self.store.set_loading(false).await;
        result
    }

    pub async fn submit_edit(&self, draft: TaskDraft) -> bool {
        let task_id = self.store.active_modal_data().await.task_id_for_edit;
        let result = match (task_id, draft.validate()) {
            (None, _) => Err(no_selection("editing")),
            (Some(_), Err(e)) => Err(e),
            (Some(task_id), Ok(())) => {
                self.store.set_loading(true).await;
                self.store.set_error(None).await;
                self.api.update(task_id, draft).await
            }
        };
        self.finish_mutation(
            result,
            "Failed to update task",
            Some(ModalName::TaskEdit),
            UPDATED_MESSAGE,
        )
        .await
    }

    // ---- Deletion confirmation modal ----

    pub async fn request_delete(&self, task_id: i64, title: impl Into<String>) {
        self.store
            .open_modal(
                ModalName::TaskDeletionConfirmation,
                Some(ActiveModalDataPatch::delete(task_id, title)),
            )
            .await;
    }

    pub async fn cancel_delete(&self) {
        self.store
            .close_modal(ModalName::TaskDeletionConfirmation)
            .await;
    }

    pub async fn confirm_delete(&self) -> bool {
        let result = match self.store.active_modal_data().await.task_id_for_delete {
            None => Err(no_selection("deletion")),
            Some(task_id) => {
                self.store.set_loading(true).await;
                self.store.set_error(None).await;
                match self.api.delete(task_id).await {
                    Ok(true) => Ok(()),
                    Ok(false) => Err(Error::TaskNotFound(task_id)),
                    Err(e) => Err(e),
                }
            }
        };
        self.finish_mutation(
            result,
            "Failed to delete task",
            Some(ModalName::TaskDeletionConfirmation),
            DELETED_MESSAGE,
        )
        .await
    }

    // ---- Shared ----

    /// Settle a mutation: refresh and close on success, report on failure
    ///
    /// A failed refresh after a successful mutation keeps its error
    /// notification instead of the success message.
    async fn finish_mutation<T>(
        &self,
        result: Result<T>,
        context: &str,
        modal: Option<ModalName>,
        success: &str,
    ) -> bool {
        match result {
            Ok(_) => {
                self.store.set_loading(false).await;
                let refreshed = self.refresh().await;
                if let Some(modal) = modal {
                    self.store.close_modal(modal).await;
                }
                if refreshed {
                    self.store
                        .show_notification(success, NotificationKind::Success)
                        .await;
                }
                true
            }
            Err(e) => {
                self.fail(context, e).await;
                self.store.set_loading(false).await;
                false
            }
        }
    }

    async fn fail(&self, context: &str, error: Error) {
        let message = format!("{}: {}", context, error);
        warn!("{}", message);
        self.store.set_error(Some(message.clone())).await;
        self.store
            .show_notification(message, NotificationKind::Error)
            .await;
    }
}

fn no_selection(purpose: &str) -> Error {
    Error::InvalidInput(format!("No task selected for {}", purpose))
}
