//! Offline task source
//!
//! Tasks live in their own storage entry so a filtered list cached by the
//! store never narrows what offline runs can see.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use mat_core::store::{AppStore, StateStorage};
use mat_core::task::{InMemoryTaskApi, OFFLINE_STORAGE_NAME};

/// Open the offline task list, seeding it from the store cache on first use
pub async fn open(storage: &dyn StateStorage, store: &AppStore) -> Result<Arc<InMemoryTaskApi>> {
    let loaded = InMemoryTaskApi::load(storage, OFFLINE_STORAGE_NAME)
        .await
        .context("Failed to load offline tasks")?;
    let api = match loaded {
        Some(api) => api,
        None => {
            info!("Seeding offline tasks from the cached list");
            InMemoryTaskApi::with_tasks(store.tasks().await)
        }
    };
    Ok(Arc::new(api))
}

pub async fn save(api: &InMemoryTaskApi, storage: &dyn StateStorage) -> Result<()> {
    api.save(storage, OFFLINE_STORAGE_NAME)
        .await
        .context("Failed to save offline tasks")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{self, Command, TaskFields};
    use mat_core::store::{FileStateStorage, StoreConfig};
    use mat_core::task::{TaskApi, TaskFilter, TaskQuery, TaskRecord, TaskStatus};
    use mat_core::view::TaskController;
    use tempfile::TempDir;

    struct Session {
        storage: Arc<FileStateStorage>,
        api: Arc<InMemoryTaskApi>,
        controller: TaskController,
    }

    async fn start(dir: &TempDir) -> Session {
        let storage = Arc::new(FileStateStorage::new(dir.path()));
        let store = AppStore::load(storage.clone(), StoreConfig::default())
            .await
            .unwrap();
        let api = open(storage.as_ref(), &store).await.unwrap();
        let controller = TaskController::new(store, api.clone());
        Session {
            storage,
            api,
            controller,
        }
    }

    async fn finish(session: Session) {
        save(&session.api, session.storage.as_ref()).await.unwrap();
        session.controller.store().save().await.unwrap();
    }

    async fn run(session: &Session, command: Command) {
        let mut out = Vec::new();
        commands::run(command, &session.controller, &mut out)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_filtered_list_does_not_drop_tasks_on_restart() {
        let dir = TempDir::new().unwrap();

        let session = start(&dir).await;
        run(
            &session,
            Command::Add {
                title: "open one".to_string(),
                fields: TaskFields::default(),
            },
        )
        .await;
        run(
            &session,
            Command::Add {
                title: "done one".to_string(),
                fields: TaskFields {
                    status: Some(TaskStatus::Completed),
                    ..TaskFields::default()
                },
            },
        )
        .await;
        run(
            &session,
            Command::Filter {
                filter: TaskFilter::Completed,
            },
        )
        .await;
        assert_eq!(session.controller.store().tasks().await.len(), 1);
        finish(session).await;

        let session = start(&dir).await;
        assert_eq!(session.api.list(&TaskQuery::default()).await.unwrap().len(), 2);

        run(&session, Command::Filter { filter: TaskFilter::All }).await;
        let mut titles: Vec<String> = session
            .controller
            .store()
            .tasks()
            .await
            .into_iter()
            .map(|t| t.title)
            .collect();
        titles.sort();
        assert_eq!(titles, vec!["done one", "open one"]);
    }

    #[tokio::test]
    async fn test_first_run_seeds_from_cache() {
        let dir = TempDir::new().unwrap();
        let storage = Arc::new(FileStateStorage::new(dir.path()));
        let store = AppStore::load(storage.clone(), StoreConfig::default())
            .await
            .unwrap();
        store.set_tasks(vec![TaskRecord::new(3, "cached")]).await;

        let api = open(storage.as_ref(), &store).await.unwrap();
        let tasks = api.list(&TaskQuery::default()).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, 3);
    }
}
