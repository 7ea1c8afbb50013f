//! Application state definitions
//!
//! Field names follow the JSON layout views and the storage entry use.

use serde::{Deserialize, Serialize};

use crate::task::{SortBy, SortOrder, TaskFilter, TaskRecord};
use crate::{Error, Result};

/// Modal identities known to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModalName {
    TaskCreation,
    TaskEdit,
    TaskDeletionConfirmation,
}

impl ModalName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TaskCreation => "task_creation",
            Self::TaskEdit => "task_edit",
            Self::TaskDeletionConfirmation => "task_deletion_confirmation",
        }
    }
}

impl std::fmt::Display for ModalName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ModalName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "task_creation" => Ok(Self::TaskCreation),
            "task_edit" => Ok(Self::TaskEdit),
            "task_deletion_confirmation" => Ok(Self::TaskDeletionConfirmation),
            other => Err(Error::InvalidInput(format!("Unknown modal: {other}"))),
        }
    }
}

/// One independent visibility flag per modal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalVisibility {
    pub task_creation: bool,
    pub task_edit: bool,
    pub task_deletion_confirmation: bool,
}

impl ModalVisibility {
    pub fn is_open(&self, modal: ModalName) -> bool {
        match modal {
            ModalName::TaskCreation => self.task_creation,
            ModalName::TaskEdit => self.task_edit,
            ModalName::TaskDeletionConfirmation => self.task_deletion_confirmation,
        }
    }

    pub fn set(&mut self, modal: ModalName, visible: bool) {
        let flag = match modal {
            ModalName::TaskCreation => &mut self.task_creation,
            ModalName::TaskEdit => &mut self.task_edit,
            ModalName::TaskDeletionConfirmation => &mut self.task_deletion_confirmation,
        };
        *flag = visible;
    }
}

/// Parameters an open modal works with
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveModalData {
    pub task_id_for_edit: Option<i64>,
    pub task_id_for_delete: Option<i64>,
    pub task_title_for_delete: Option<String>,
}

impl ActiveModalData {
    /// Shallow merge: only fields present in the patch are written
    pub fn merge(&mut self, patch: ActiveModalDataPatch) {
        if let Some(id) = patch.task_id_for_edit {
            self.task_id_for_edit = id;
        }
        if let Some(id) = patch.task_id_for_delete {
            self.task_id_for_delete = id;
        }
        if let Some(title) = patch.task_title_for_delete {
            self.task_title_for_delete = title;
        }
    }

    /// Drop the data tied to a modal that is being closed
    pub fn clear_for(&mut self, modal: ModalName) {
        match modal {
            ModalName::TaskEdit => self.task_id_for_edit = None,
            ModalName::TaskDeletionConfirmation => {
                self.task_id_for_delete = None;
                self.task_title_for_delete = None;
            }
            ModalName::TaskCreation => {}
        }
    }
}

/// Partial update of [`ActiveModalData`]
///
/// The outer `Option` says whether the field is set at all; `Some(None)`
/// writes null.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveModalDataPatch {
    pub task_id_for_edit: Option<Option<i64>>,
    pub task_id_for_delete: Option<Option<i64>>,
    pub task_title_for_delete: Option<Option<String>>,
}

impl ActiveModalDataPatch {
    pub fn edit(task_id: i64) -> Self {
        Self {
            task_id_for_edit: Some(Some(task_id)),
            ..Self::default()
        }
    }

    pub fn delete(task_id: i64, title: impl Into<String>) -> Self {
        Self {
            task_id_for_delete: Some(Some(task_id)),
            task_title_for_delete: Some(Some(title.into())),
            ..Self::default()
        }
    }

    pub fn with_task_id_for_edit(mut self, id: Option<i64>) -> Self {
        self.task_id_for_edit = Some(id);
        self
    }

    pub fn with_task_id_for_delete(mut self, id: Option<i64>) -> Self {
        self.task_id_for_delete = Some(id);
        self
    }

    pub fn with_task_title_for_delete(mut self, title: Option<String>) -> Self {
        self.task_title_for_delete = Some(title);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

/// Transient status message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
}

impl Notification {
    pub fn new(message: impl Into<String>, kind: NotificationKind) -> Self {
        Self {
            message: Some(message.into()),
            kind,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.message.is_none()
    }
}

/// Presentation parameters for the task list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewPreferences {
    pub filter: TaskFilter,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
}

/// The subset of state kept across sessions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    pub tasks: Vec<TaskRecord>,
    pub filter: TaskFilter,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
}

/// Full application state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    pub tasks: Vec<TaskRecord>,
    pub filter: TaskFilter,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    pub is_loading: bool,
    pub error: Option<String>,
    pub modal_visibility: ModalVisibility,
    pub active_modal_data: ActiveModalData,
    pub notification: Notification,
}

impl AppState {
    /// Restore persisted fields, everything else at defaults
    pub fn from_persisted(persisted: PersistedState) -> Self {
        let mut state = Self::default();
        state.restore(persisted);
        state
    }

    pub fn restore(&mut self, persisted: PersistedState) {
        self.tasks = persisted.tasks;
        self.filter = persisted.filter;
        self.sort_by = persisted.sort_by;
        self.sort_order = persisted.sort_order;
    }

    pub fn persisted(&self) -> PersistedState {
        PersistedState {
            tasks: self.tasks.clone(),
            filter: self.filter,
            sort_by: self.sort_by,
            sort_order: self.sort_order,
        }
    }

    pub fn preferences(&self) -> ViewPreferences {
        ViewPreferences {
            filter: self.filter,
            sort_by: self.sort_by,
            sort_order: self.sort_order,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        let state = AppState::default();
        assert!(state.tasks.is_empty());
        assert_eq!(state.filter, TaskFilter::All);
        assert_eq!(state.sort_by, SortBy::DueDate);
        assert_eq!(state.sort_order, SortOrder::Asc);
        assert!(!state.is_loading);
        assert!(state.error.is_none());
        assert_eq!(state.modal_visibility, ModalVisibility::default());
        assert_eq!(state.active_modal_data, ActiveModalData::default());
        assert_eq!(state.notification.message, None);
        assert_eq!(state.notification.kind, NotificationKind::Info);
    }

    #[test]
    fn test_merge_is_shallow() {
        let mut data = ActiveModalData {
            task_title_for_delete: Some("Buy milk".to_string()),
            ..ActiveModalData::default()
        };
        data.merge(ActiveModalDataPatch::default().with_task_id_for_delete(Some(3)));

        assert_eq!(data.task_id_for_delete, Some(3));
        assert_eq!(data.task_title_for_delete.as_deref(), Some("Buy milk"));
    }

    #[test]
    fn test_merge_explicit_null() {
        let mut data = ActiveModalData {
            task_id_for_edit: Some(4),
            ..ActiveModalData::default()
        };
        data.merge(ActiveModalDataPatch::default().with_task_id_for_edit(None));
        assert_eq!(data.task_id_for_edit, None);
    }

    #[test]
    fn test_clear_for_creation_keeps_data() {
        let mut data = ActiveModalData {
            task_id_for_edit: Some(1),
            task_id_for_delete: Some(2),
            task_title_for_delete: Some("x".to_string()),
        };
        let before = data.clone();
        data.clear_for(ModalName::TaskCreation);
        assert_eq!(data, before);

        data.clear_for(ModalName::TaskDeletionConfirmation);
        assert_eq!(data.task_id_for_edit, Some(1));
        assert!(data.task_id_for_delete.is_none());
        assert!(data.task_title_for_delete.is_none());
    }

    #[test]
    fn test_notification_wire_format() {
        let value = serde_json::to_value(Notification::default()).unwrap();
        assert_eq!(value, serde_json::json!({ "message": null, "type": "info" }));
    }

    #[test]
    fn test_modal_name_parse() {
        assert_eq!("task_edit".parse::<ModalName>().unwrap(), ModalName::TaskEdit);
        assert!("settings".parse::<ModalName>().is_err());
    }
}
