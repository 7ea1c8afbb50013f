//! Task module
//!
//! This module contains the task record model, list query types and the
//! remote API port.

mod api;
mod memory_api;
mod model;
mod query;

pub use api::TaskApi;
pub use memory_api::{InMemoryTaskApi, OFFLINE_STORAGE_NAME};
pub use model::*;
pub use query::*;
