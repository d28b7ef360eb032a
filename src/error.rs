/// Error types for homework-notes
///
/// This module defines all possible errors that can occur in the application.
/// Uses thiserror for ergonomic error handling.

use sqlx::error::ErrorKind;
use thiserror::Error;

/// Main error type for homework-notes operations
#[derive(Error, Debug)]
pub enum NotesError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// A write broke a unique, not-null or foreign key constraint.
    /// The transaction has already been rolled back.
    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),

    /// I/O errors (image files, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No user with this id
    #[error("User not found: {0}")]
    UserNotFound(i64),

    /// No post with this id
    #[error("Post not found: {0}")]
    PostNotFound(i64),

    /// Operation needs a record that has been created first
    #[error("{0} has not been created yet")]
    NotPersisted(&'static str),

    /// Record is already saved; create would insert a second row
    #[error("{0} has already been created")]
    AlreadyCreated(&'static str),

    /// Post has no owning user
    #[error("Post has no owning user")]
    MissingOwner,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for homework-notes operations
pub type Result<T> = std::result::Result<T, NotesError>;

impl From<sqlx::Error> for NotesError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => {
                    return NotesError::ConstraintViolation(db_err.message().to_string());
                }
                _ => {}
            }
        }
        NotesError::Database(err)
    }
}

impl NotesError {
    /// True when the write was rejected by an integrity constraint
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, NotesError::ConstraintViolation(_))
    }

    /// Convert NotesError to a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            NotesError::Database(e) => {
                format!("Database error occurred. Please try again. Details: {}", e)
            }
            NotesError::ConstraintViolation(detail) => {
                format!("Record clashes with existing data ({})", detail)
            }
            NotesError::Io(e) => {
                format!("File system error. Check the upload folder. Details: {}", e)
            }
            NotesError::Serialization(e) => {
                format!("Data format error: {}", e)
            }
            NotesError::UserNotFound(id) => {
                format!("No user with id {}", id)
            }
            NotesError::PostNotFound(id) => {
                format!("No post with id {}", id)
            }
            NotesError::NotPersisted(what) => {
                format!("{} must be created before this operation", what)
            }
            NotesError::AlreadyCreated(what) => {
                format!("{} is already saved; use update instead", what)
            }
            NotesError::MissingOwner => "Post needs an owning user".to_string(),
            NotesError::Config(msg) => {
                format!("Configuration issue: {}", msg)
            }
        }
    }
}
