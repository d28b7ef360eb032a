/// homework-notes library
///
/// Homework assignments and the notes attached to them, stored in SQLite.

pub mod config;
pub mod core;
pub mod db;
pub mod error;
pub mod logging;

// Re-exports for convenience
pub use config::Config;
pub use crate::core::{init_users, Post, User, UserUpdate};
pub use db::Database;
pub use error::{NotesError, Result};
