//! Core library for Make-a-Task
//!
//! This crate contains the client-side logic, including:
//! - The task record model and the remote API port
//! - The application state store and its persistence
//! - View controllers that drive the store from API round-trips

pub mod error;
pub mod store;
pub mod task;
pub mod view;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
