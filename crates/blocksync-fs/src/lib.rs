//! Filesystem primitives for blocksync
//!
//! Provides normalized path handling, locked atomic writes, and
//! format-agnostic loading of job files and lookup tables.

pub mod checksum;
pub mod config;
pub mod error;
pub mod io;
pub mod path;

pub use checksum::Checksum;
pub use config::ConfigStore;
pub use error::{Error, Result};
pub use io::RobustnessConfig;
pub use path::NormalizedPath;
