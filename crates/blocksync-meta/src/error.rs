//! Error types for blocksync-meta

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Filesystem error: {0}")]
    Fs(#[from] blocksync_fs::Error),

    #[error("Job file too large: {path} is {size} bytes (max {max})")]
    ConfigTooLarge { path: PathBuf, size: u64, max: u64 },

    #[error("Invalid job file at {path}: {message}")]
    InvalidConfig { path: PathBuf, message: String },

    #[error("Invalid job {job:?}: {source}")]
    InvalidJob {
        job: String,
        #[source]
        source: blocksync_core::Error,
    },

    #[error("Job {job:?} failed: {source}")]
    JobFailed {
        job: String,
        #[source]
        source: blocksync_core::Error,
    },

    #[error("Unknown job: {name}")]
    UnknownJob { name: String },
}
