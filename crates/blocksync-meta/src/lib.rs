//! Job file schema and loading for blocksync.
//!
//! A job file (`blocksync.toml`) declares one `[[job]]` per managed block.
//! [`JobSet::load`] parses and validates it and turns every job into a ready
//! [`blocksync_core::BlockSynchronizer`] with its discovery adapter.

pub mod config;
pub mod error;
pub mod loader;
pub mod validation;

pub use config::{DiscoverConfig, ExtractConfig, JobConfig, JobFile, LookupConfig};
pub use error::{Error, Result};
pub use loader::{JOB_FILE_NAME, Job, JobSet};
