//! REST client for the remote task API

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use mat_core::task::{TaskApi, TaskDraft, TaskQuery, TaskRecord};

use crate::error::{ClientError, Result};

/// Base URL used when none is configured
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";

/// REST client for the task service
#[derive(Debug, Clone)]
pub struct HttpTaskApi {
    client: Client,
    base_url: String,
}

impl HttpTaskApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        info!("Using task API at {}", base_url);
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn tasks_url(&self) -> String {
        format!("{}/tasks", self.base_url)
    }

    fn task_url(&self, id: i64) -> String {
        format!("{}/tasks/{}", self.base_url, id)
    }

    async fn fetch_list(&self, query: &TaskQuery) -> Result<Vec<TaskRecord>> {
        let url = self.tasks_url();
        debug!("GET {} {:?}", url, query);
        let res = self
            .client
            .get(url)
            .query(&query_pairs(query))
            .send()
            .await?;
        decode(check(res).await?).await
    }

    async fn fetch_one(&self, id: i64) -> Result<Option<TaskRecord>> {
        let url = self.task_url(id);
        debug!("GET {}", url);
        let res = self.client.get(url).send().await?;
        if res.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        decode(check(res).await?).await.map(Some)
    }

    async fn post_task(&self, draft: &TaskDraft) -> Result<TaskRecord> {
        let url = self.tasks_url();
        debug!("POST {}", url);
        let res = self.client.post(url).json(draft).send().await?;
        decode(check(res).await?).await
    }

    async fn put_task(&self, id: i64, draft: &TaskDraft) -> Result<TaskRecord> {
        let url = self.task_url(id);
        debug!("PUT {}", url);
        let res = self.client.put(url).json(draft).send().await?;
        decode(check(res).await?).await
    }

    async fn delete_task(&self, id: i64) -> Result<bool> {
        let url = self.task_url(id);
        debug!("DELETE {}", url);
        let res = self.client.delete(url).send().await?;
        if res.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        check(res).await?;
        Ok(true)
    }
}

#[async_trait]
impl TaskApi for HttpTaskApi {
    async fn list(&self, query: &TaskQuery) -> mat_core::Result<Vec<TaskRecord>> {
        Ok(self.fetch_list(query).await?)
    }

    async fn get(&self, id: i64) -> mat_core::Result<Option<TaskRecord>> {
        Ok(self.fetch_one(id).await?)
    }

    async fn create(&self, draft: TaskDraft) -> mat_core::Result<TaskRecord> {
        Ok(self.post_task(&draft).await?)
    }

    async fn update(&self, id: i64, draft: TaskDraft) -> mat_core::Result<TaskRecord> {
        Ok(self.put_task(id, &draft).await?)
    }

    async fn delete(&self, id: i64) -> mat_core::Result<bool> {
        Ok(self.delete_task(id).await?)
    }
}

/// Query string for the list endpoint
fn query_pairs(query: &TaskQuery) -> Vec<(&'static str, &'static str)> {
    let mut pairs = Vec::with_capacity(3);
    if let Some(status) = query.status {
        pairs.push(("status", status.as_str()));
    }
    pairs.push(("sort_by", query.sort_by.as_str()));
    pairs.push(("sort_order", query.sort_order.as_str()));
    pairs
}

async fn check(res: Response) -> Result<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    Err(ClientError::status(status.as_u16(), body))
}

async fn decode<T: DeserializeOwned>(res: Response) -> Result<T> {
    let bytes = res.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mat_core::task::{SortBy, SortOrder, TaskFilter};

    #[test]
    fn test_base_url_trailing_slash() {
        let api = HttpTaskApi::new("http://localhost:3000/");
        assert_eq!(api.base_url(), "http://localhost:3000");
        assert_eq!(api.tasks_url(), "http://localhost:3000/tasks");
        assert_eq!(api.task_url(7), "http://localhost:3000/tasks/7");
    }

    #[test]
    fn test_query_pairs_without_filter() {
        let query = TaskQuery::new(TaskFilter::All, SortBy::DueDate, SortOrder::Asc);
        assert_eq!(
            query_pairs(&query),
            vec![("sort_by", "due_date"), ("sort_order", "asc")]
        );
    }

    #[test]
    fn test_query_pairs_with_filter() {
        let query = TaskQuery::new(
            TaskFilter::InProgress,
            SortBy::PlannedCompletionDate,
            SortOrder::Desc,
        );
        assert_eq!(
            query_pairs(&query),
            vec![
                ("status", "in_progress"),
                ("sort_by", "planned_completion_date"),
                ("sort_order", "desc"),
            ]
        );
    }

    #[tokio::test]
    async fn test_unreachable_service_is_remote_error() {
        // Reserve a free port, then release it so nothing is listening
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = Client::builder().no_proxy().build().unwrap();
        let api = HttpTaskApi::with_client(client, format!("http://127.0.0.1:{}", port));
        let err = TaskApi::list(&api, &TaskQuery::default()).await.unwrap_err();
        assert!(matches!(err, mat_core::Error::Remote { status: None, .. }));
    }
}
