//! Application state store
//!
//! Holds the task cache, view preferences and transient UI state shared by
//! all views, and keeps the persisted subset in durable storage.

mod app_store;
mod event;
pub mod persistence;
mod state;

pub use app_store::{AppStore, StoreConfig, NOTIFICATION_TIMEOUT};
pub use event::StoreEvent;
pub use persistence::{FileStateStorage, MemoryStateStorage, StateStorage, DEFAULT_STORAGE_NAME};
pub use state::*;
