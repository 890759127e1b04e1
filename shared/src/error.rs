use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogError {
    #[error("Can't create log directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Can't open log file {path}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("A global logger is already installed")]
    AlreadyInitialized,
}

pub trait AsLogError<T> {
    fn into_log_error(self, path: impl Into<PathBuf>) -> Result<T, LogError>;
}

impl<T> AsLogError<T> for std::io::Result<T> {
    #[inline]
    fn into_log_error(self, path: impl Into<PathBuf>) -> Result<T, LogError> {
        self.map_err(|source| LogError::OpenFile {
            path: path.into(),
            source,
        })
    }
}
