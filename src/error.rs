use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FetchError>;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Staging directory already exists: {path} (remove it or run `cdrfetch clean --confirm`)")]
    SetupConflict { path: PathBuf },

    #[error("Network error fetching {url}: {message}")]
    NetworkError { url: String, message: String },

    #[error("Disk error at {path}: {source}")]
    DiskError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt archive {path}: {message}")]
    CorruptArchive { path: PathBuf, message: String },

    #[error("Dataset member '{name}' not found in extracted tree: {path}")]
    MissingSource { name: String, path: PathBuf },

    #[error("Could not remove staging directory {path}: {source}")]
    CleanupWarning {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    pub fn disk<P: AsRef<Path>>(path: P, source: std::io::Error) -> Self {
        FetchError::DiskError {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn network<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        FetchError::NetworkError {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn corrupt<P: AsRef<Path>, M: Into<String>>(path: P, message: M) -> Self {
        FetchError::CorruptArchive {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    pub fn config_error<S: Into<String>>(message: S) -> Self {
        FetchError::ConfigError {
            message: message.into(),
        }
    }

    /// Everything except a failed staging cleanup aborts the run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, FetchError::CleanupWarning { .. })
    }
}
