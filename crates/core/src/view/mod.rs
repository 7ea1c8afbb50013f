//! View-side logic
//!
//! The list derivation and the create/edit/delete flows views run against
//! the remote API, feeding the outcomes back into the store.

mod controller;
pub mod list;

pub use controller::TaskController;
pub use list::visible_tasks;
