//! In-memory task API implementation
//!
//! Behaves like the remote service: assigns ids and timestamps, filters and
//! orders on list. Used for tests and offline runs.
//!
//! Offline runs keep the full task list in its own storage entry, separate
//! from the filtered list cached by the state store.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::warn;

use super::api::TaskApi;
use super::model::{TaskDraft, TaskRecord};
use super::query::{sort_tasks, TaskQuery};
use crate::store::StateStorage;
use crate::{Error, Result};

/// Storage entry holding the offline task list
pub const OFFLINE_STORAGE_NAME: &str = "make-a-task-offline";

#[derive(Serialize, Deserialize)]
struct Snapshot {
    next_id: i64,
    tasks: Vec<TaskRecord>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    tasks: BTreeMap<i64, TaskRecord>,
}

/// In-memory task API
#[derive(Debug, Default)]
pub struct InMemoryTaskApi {
    inner: RwLock<Inner>,
    unavailable: AtomicBool,
}

impl InMemoryTaskApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an API pre-populated with records, keeping their ids
    pub fn with_tasks(tasks: impl IntoIterator<Item = TaskRecord>) -> Self {
        let tasks: BTreeMap<i64, TaskRecord> = tasks.into_iter().map(|t| (t.id, t)).collect();
        let next_id = tasks.keys().next_back().copied().unwrap_or(0);
        Self {
            inner: RwLock::new(Inner { next_id, tasks }),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Restore a task list written by [`InMemoryTaskApi::save`]
    ///
    /// Returns `None` when the entry is missing or unreadable.
    pub async fn load(storage: &dyn StateStorage, name: &str) -> Result<Option<Self>> {
        let Some(content) = storage.load(name).await? else {
            return Ok(None);
        };
        let snapshot: Snapshot = match serde_json::from_str(&content) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Ignoring unreadable task entry {}: {}", name, e);
                return Ok(None);
            }
        };

        let api = Self::with_tasks(snapshot.tasks);
        let mut inner = api.inner.into_inner();
        inner.next_id = inner.next_id.max(snapshot.next_id);
        Ok(Some(Self {
            inner: RwLock::new(inner),
            unavailable: api.unavailable,
        }))
    }

    /// Write every task, whatever the last list query was
    pub async fn save(&self, storage: &dyn StateStorage, name: &str) -> Result<()> {
        let content = {
            let inner = self.inner.read().await;
            serde_json::to_string(&Snapshot {
                next_id: inner.next_id,
                tasks: inner.tasks.values().cloned().collect(),
            })?
        };
        storage.save(name, &content).await
    }

    /// Make every call fail as if the service were down
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Error::remote(Some(503), "Service unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl TaskApi for InMemoryTaskApi {
    async fn list(&self, query: &TaskQuery) -> Result<Vec<TaskRecord>> {
        self.check_available()?;
        let inner = self.inner.read().await;
        let mut tasks: Vec<TaskRecord> = inner
            .tasks
            .values()
            .filter(|t| query.status.map_or(true, |s| s == t.status))
            .cloned()
            .collect();
        sort_tasks(&mut tasks, query.sort_by, query.sort_order);
        Ok(tasks)
    }

    async fn get(&self, id: i64) -> Result<Option<TaskRecord>> {
        self.check_available()?;
        let inner = self.inner.read().await;
        Ok(inner.tasks.get(&id).cloned())
    }

    async fn create(&self, draft: TaskDraft) -> Result<TaskRecord> {
        self.check_available()?;
        draft.validate()?;

        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let mut task = TaskRecord::new(inner.next_id, draft.title.clone());
        apply_draft(&mut task, draft);
        inner.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn update(&self, id: i64, draft: TaskDraft) -> Result<TaskRecord> {
        self.check_available()?;
        draft.validate()?;

        let mut inner = self.inner.write().await;
        let task = inner.tasks.get_mut(&id).ok_or(Error::TaskNotFound(id))?;
        apply_draft(task, draft);
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        self.check_available()?;
        let mut inner = self.inner.write().await;
        Ok(inner.tasks.remove(&id).is_some())
    }
}

fn apply_draft(task: &mut TaskRecord, draft: TaskDraft) {
    task.title = draft.title;
    task.description = draft.description;
    task.due_date = draft.due_date;
    task.due_time = draft.due_time;
    task.planned_completion_date = draft.planned_completion_date;
    task.estimated_finish_time = draft.estimated_finish_time;
    task.status = draft.status;
}
