//! Remote task API trait
//!
//! Defines the interface views use to reach the remote task service.

use async_trait::async_trait;

use super::model::{TaskDraft, TaskRecord};
use super::query::TaskQuery;
use crate::Result;

/// Remote interface for task CRUD operations
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// List tasks matching the query, ordered as requested
    async fn list(&self, query: &TaskQuery) -> Result<Vec<TaskRecord>>;

    /// Get a task by ID
    async fn get(&self, id: i64) -> Result<Option<TaskRecord>>;

    /// Create a new task, returning the record with server-assigned fields
    async fn create(&self, draft: TaskDraft) -> Result<TaskRecord>;

    /// Replace the editable fields of an existing task
    async fn update(&self, id: i64, draft: TaskDraft) -> Result<TaskRecord>;

    /// Delete a task by ID
    async fn delete(&self, id: i64) -> Result<bool>;
}
