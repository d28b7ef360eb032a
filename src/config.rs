/// Runtime configuration
///
/// Where the database lives and where post images are read from.

use crate::error::{NotesError, Result};
use std::env;
use std::path::PathBuf;

/// Overrides the database file location
pub const DB_PATH_ENV: &str = "HOMEWORK_NOTES_DB";
/// Overrides the image upload folder
pub const UPLOAD_FOLDER_ENV: &str = "HOMEWORK_NOTES_UPLOADS";

const APP_DIR: &str = ".homework-notes";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_path: PathBuf,
    pub upload_folder: PathBuf,
}

impl Config {
    /// Build config from the environment, falling back to ~/.homework-notes
    pub fn from_env() -> Result<Self> {
        Self::resolve(
            env::var_os(DB_PATH_ENV).map(PathBuf::from),
            env::var_os(UPLOAD_FOLDER_ENV).map(PathBuf::from),
            dirs::home_dir(),
        )
    }

    fn resolve(
        database_path: Option<PathBuf>,
        upload_folder: Option<PathBuf>,
        home: Option<PathBuf>,
    ) -> Result<Self> {
        let app_dir = || {
            home.as_ref()
                .map(|h| h.join(APP_DIR))
                .ok_or_else(|| NotesError::Config("could not find home directory".to_string()))
        };

        let database_path = match database_path {
            Some(path) => path,
            None => app_dir()?.join("notes.db"),
        };
        let upload_folder = match upload_folder {
            Some(path) => path,
            None => app_dir()?.join("uploads"),
        };

        Ok(Self {
            database_path,
            upload_folder,
        })
    }
}
