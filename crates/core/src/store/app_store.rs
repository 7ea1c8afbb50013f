//! Application state store
//!
//! A cloneable handle over the shared [`AppState`]. Views hold a clone,
//! read fields, call actions, and subscribe to [`StoreEvent`]s. The store
//! does no network I/O; it only records what views tell it.

use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{broadcast, watch, RwLock};
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use crate::task::{SortBy, SortOrder, TaskFilter, TaskRecord};
use crate::Result;

use super::event::StoreEvent;
use super::persistence::{read_entry, write_entry, StateStorage, DEFAULT_STORAGE_NAME};
use super::state::{
    ActiveModalData, ActiveModalDataPatch, AppState, ModalName, ModalVisibility, Notification,
    NotificationKind, PersistedState, ViewPreferences,
};

/// How long a notification stays up
pub const NOTIFICATION_TIMEOUT: Duration = Duration::from_millis(3000);

const EVENT_CAPACITY: usize = 100;

/// Store settings
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Name of the storage entry holding the persisted subset
    pub storage_name: String,
    pub notification_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_name: DEFAULT_STORAGE_NAME.to_string(),
            notification_timeout: NOTIFICATION_TIMEOUT,
        }
    }
}

struct Guarded {
    app: AppState,
    /// Bumped by every `show_notification`; a timer only clears its own
    notification_token: u64,
    notification_timer: Option<AbortHandle>,
}

struct Inner {
    state: RwLock<Guarded>,
    config: StoreConfig,
    storage: Arc<dyn StateStorage>,
    events: broadcast::Sender<StoreEvent>,
    persist_tx: watch::Sender<PersistedState>,
}

/// Shared application state store
#[derive(Clone)]
pub struct AppStore {
    inner: Arc<Inner>,
}

impl AppStore {
    /// Create the store, restoring the persisted subset from storage
    ///
    /// Spawns the background writer that saves persisted fields after
    /// each change, so this must run inside a tokio runtime.
    pub async fn load(storage: Arc<dyn StateStorage>, config: StoreConfig) -> Result<Self> {
        let app = match read_entry(storage.as_ref(), &config.storage_name).await? {
            Some(persisted) => {
                info!(
                    "Restored {} tasks from storage entry {}",
                    persisted.tasks.len(),
                    config.storage_name
                );
                AppState::from_persisted(persisted)
            }
            None => AppState::default(),
        };

        let (persist_tx, persist_rx) = watch::channel(app.persisted());
        spawn_writer(Arc::clone(&storage), config.storage_name.clone(), persist_rx);

        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Ok(Self {
            inner: Arc::new(Inner {
                state: RwLock::new(Guarded {
                    app,
                    notification_token: 0,
                    notification_timer: None,
                }),
                config,
                storage,
                events,
                persist_tx,
            }),
        })
    }

    /// Subscribe to change events
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.inner.events.subscribe()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    // ---- Reads ----

    /// Get a copy of the full state
    pub async fn snapshot(&self) -> AppState {
        self.inner.state.read().await.app.clone()
    }

    pub async fn tasks(&self) -> Vec<TaskRecord> {
        self.inner.state.read().await.app.tasks.clone()
    }

    pub async fn preferences(&self) -> ViewPreferences {
        self.inner.state.read().await.app.preferences()
    }

    pub async fn is_loading(&self) -> bool {
        self.inner.state.read().await.app.is_loading
    }

    pub async fn error(&self) -> Option<String> {
        self.inner.state.read().await.app.error.clone()
    }

    pub async fn modal_visibility(&self) -> ModalVisibility {
        self.inner.state.read().await.app.modal_visibility
    }

    pub async fn active_modal_data(&self) -> ActiveModalData {
        self.inner.state.read().await.app.active_modal_data.clone()
    }

    pub async fn notification(&self) -> Notification {
        self.inner.state.read().await.app.notification.clone()
    }

    pub async fn persisted(&self) -> PersistedState {
        self.inner.state.read().await.app.persisted()
    }

    // ---- State setters ----

    /// Replace the whole task collection
    pub async fn set_tasks(&self, tasks: Vec<TaskRecord>) {
        debug!("set_tasks: {} tasks", tasks.len());
        self.update(StoreEvent::Tasks, |s| s.app.tasks = tasks).await;
    }

    pub async fn set_filter(&self, filter: TaskFilter) {
        debug!("set_filter: {}", filter.as_str());
        self.update(StoreEvent::Preferences, |s| s.app.filter = filter).await;
    }

    pub async fn set_sort(&self, sort_by: SortBy, sort_order: SortOrder) {
        debug!("set_sort: {} {}", sort_by.as_str(), sort_order.as_str());
        self.update(StoreEvent::Preferences, |s| {
            s.app.sort_by = sort_by;
            s.app.sort_order = sort_order;
        })
        .await;
    }

    pub async fn set_loading(&self, is_loading: bool) {
        self.update(StoreEvent::Loading, |s| s.app.is_loading = is_loading).await;
    }

    pub async fn set_error(&self, error: Option<String>) {
        if let Some(message) = &error {
            debug!("set_error: {}", message);
        }
        self.update(StoreEvent::Error, |s| s.app.error = error).await;
    }

    // ---- Modal control ----

    /// Show a modal, merging any supplied parameters into the modal data
    pub async fn open_modal(&self, modal: ModalName, data: Option<ActiveModalDataPatch>) {
        debug!("open_modal: {}", modal);
        self.update(StoreEvent::Modal, |s| {
            s.app.modal_visibility.set(modal, true);
            if let Some(patch) = data {
                s.app.active_modal_data.merge(patch);
            }
        })
        .await;
    }

    /// Hide a modal and drop the data tied to it
    ///
    /// Closing `task_creation` leaves the modal data untouched.
    pub async fn close_modal(&self, modal: ModalName) {
        debug!("close_modal: {}", modal);
        self.update(StoreEvent::Modal, |s| {
            s.app.modal_visibility.set(modal, false);
            s.app.active_modal_data.clear_for(modal);
        })
        .await;
    }

    /// Set a visibility flag without touching modal data
    pub async fn set_modal_visibility(&self, modal: ModalName, visible: bool) {
        self.update(StoreEvent::Modal, |s| {
            s.app.modal_visibility.set(modal, visible)
        })
        .await;
    }

    pub async fn set_active_modal_data(&self, patch: ActiveModalDataPatch) {
        self.update(StoreEvent::Modal, |s| s.app.active_modal_data.merge(patch))
            .await;
    }

    // ---- Notifications ----

    /// Replace the notification and schedule it to clear
    ///
    /// A later call supersedes the pending clear of an earlier one.
    pub async fn show_notification(&self, message: impl Into<String>, kind: NotificationKind) {
        let notification = Notification::new(message, kind);
        debug!("show_notification: {:?}", notification);

        let timeout = self.inner.config.notification_timeout;
        let weak = Arc::downgrade(&self.inner);

        self.update(StoreEvent::Notification, move |s| {
            s.notification_token += 1;
            let token = s.notification_token;
            s.app.notification = notification;

            if let Some(previous) = s.notification_timer.take() {
                previous.abort();
            }
            let handle = tokio::spawn(expire_notification(weak, token, timeout));
            s.notification_timer = Some(handle.abort_handle());
        })
        .await;
    }

    pub async fn clear_notification(&self) {
        self.update(StoreEvent::Notification, |s| {
            s.app.notification = Notification::default()
        })
        .await;
    }

    // ---- Persistence ----

    /// Reload the persisted fields from storage
    ///
    /// Leaves the current values in place when the entry is missing.
    pub async fn initialize_state_from_local_storage(&self) -> Result<()> {
        let Some(persisted) =
            read_entry(self.inner.storage.as_ref(), &self.inner.config.storage_name).await?
        else {
            return Ok(());
        };
        self.update(StoreEvent::Restored, |s| s.app.restore(persisted))
            .await;
        Ok(())
    }

    /// Write the persisted fields now and wait for the result
    pub async fn save(&self) -> Result<()> {
        let persisted = self.persisted().await;
        write_entry(
            self.inner.storage.as_ref(),
            &self.inner.config.storage_name,
            &persisted,
        )
        .await
    }

    /// Apply a mutation under the write lock, then persist and notify
    async fn update<R>(&self, event: StoreEvent, f: impl FnOnce(&mut Guarded) -> R) -> R {
        let (result, persisted) = {
            let mut guard = self.inner.state.write().await;
            let result = f(&mut *guard);
            let persisted = event.touches_persisted().then(|| guard.app.persisted());
            (result, persisted)
        };

        if let Some(persisted) = persisted {
            self.inner.persist_tx.send_replace(persisted);
        }
        // No subscribers is fine
        let _ = self.inner.events.send(event);
        result
    }
}

async fn expire_notification(inner: Weak<Inner>, token: u64, timeout: Duration) {
    tokio::time::sleep(timeout).await;

    let Some(inner) = inner.upgrade() else {
        return;
    };
    let cleared = {
        let mut guard = inner.state.write().await;
        if guard.notification_token == token && !guard.app.notification.is_empty() {
            guard.app.notification = Notification::default();
            guard.notification_timer = None;
            true
        } else {
            false
        }
    };
    if cleared {
        debug!("Notification expired");
        let _ = inner.events.send(StoreEvent::Notification);
    }
}

fn spawn_writer(
    storage: Arc<dyn StateStorage>,
    name: String,
    mut persist_rx: watch::Receiver<PersistedState>,
) {
    tokio::spawn(async move {
        while persist_rx.changed().await.is_ok() {
            let persisted = persist_rx.borrow_and_update().clone();
            if let Err(e) = write_entry(storage.as_ref(), &name, &persisted).await {
                warn!("Failed to persist state to {}: {}", name, e);
            }
        }
        debug!("State writer for {} stopped", name);
    });
}
