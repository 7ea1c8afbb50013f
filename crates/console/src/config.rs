//! Runtime configuration read from the environment

use std::path::PathBuf;
use std::time::Duration;

use mat_core::store::{StoreConfig, DEFAULT_STORAGE_NAME, NOTIFICATION_TIMEOUT};
use mat_remote_api::DEFAULT_API_BASE_URL;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub data_dir: PathBuf,
    pub notification_timeout: Duration,
    /// Serve tasks from an in-process API instead of the remote service
    pub offline: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_base_url = lookup("MAT_API_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let data_dir = lookup("MAT_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".mat-data"));
        let notification_timeout = lookup("MAT_NOTIFICATION_MS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(NOTIFICATION_TIMEOUT);
        let offline = flag(lookup("MAT_OFFLINE").as_deref(), false);

        Self {
            api_base_url,
            data_dir,
            notification_timeout,
            offline,
        }
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            storage_name: DEFAULT_STORAGE_NAME.to_string(),
            notification_timeout: self.notification_timeout,
        }
    }
}

fn flag(raw: Option<&str>, default: bool) -> bool {
    match raw {
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        None => default,
    }
}
