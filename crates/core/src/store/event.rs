//! Change notifications emitted by the store

use serde::Serialize;

/// Slice of state touched by an action
///
/// Sent once per action, after the mutation is visible to readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreEvent {
    Tasks,
    Preferences,
    Loading,
    Error,
    Modal,
    Notification,
    /// Persisted fields were reloaded from storage
    Restored,
}

impl StoreEvent {
    /// Whether the change must be written back to storage
    pub fn touches_persisted(&self) -> bool {
        matches!(self, Self::Tasks | Self::Preferences)
    }
}
