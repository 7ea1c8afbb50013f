//! HTTP implementation of the Make-a-Task remote API
//!
//! Provides [`HttpTaskApi`], a [`mat_core::task::TaskApi`] backed by the
//! REST endpoints under `{base_url}/tasks`.

mod client;
mod error;

pub use client::{HttpTaskApi, DEFAULT_API_BASE_URL};
pub use error::{ClientError, Result};
