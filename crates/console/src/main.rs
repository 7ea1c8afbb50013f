//! Console front end for Make-a-Task
//!
//! Composes the state store, its file storage and the task API, then runs
//! one view action per invocation.

mod commands;
mod config;
mod offline;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mat_core::store::{AppStore, FileStateStorage};
use mat_core::task::TaskApi;
use mat_core::view::TaskController;
use mat_remote_api::HttpTaskApi;

use crate::commands::Command;
use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "make-a-task")]
#[command(about = "Manage a task list backed by the Make-a-Task API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "make_a_task=info,mat_core=info,mat_remote_api=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env();
    tracing::info!("Using data directory: {:?}", config.data_dir);

    let storage = Arc::new(FileStateStorage::new(config.data_dir.clone()));
    let store = AppStore::load(storage.clone(), config.store_config())
        .await
        .context("Failed to load saved state")?;

    let offline_api = if config.offline {
        tracing::info!("Offline mode: serving tasks from local storage");
        Some(offline::open(storage.as_ref(), &store).await?)
    } else {
        None
    };
    let api: Arc<dyn TaskApi> = match &offline_api {
        Some(api) => api.clone(),
        None => Arc::new(HttpTaskApi::new(config.api_base_url.clone())),
    };
    let controller = TaskController::new(store.clone(), api);

    let command = cli.command.unwrap_or(Command::List { json: false });
    let mut stdout = std::io::stdout().lock();
    let result = commands::run(command, &controller, &mut stdout).await;

    if let Some(api) = &offline_api {
        offline::save(api, storage.as_ref()).await?;
    }
    store.save().await.context("Failed to save state")?;
    result
}
