//! Atomic I/O operations with file locking

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use backoff::ExponentialBackoffBuilder;
use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

/// Tuning for [`write_atomic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RobustnessConfig {
    /// How long to keep retrying the advisory lock before giving up.
    pub lock_timeout: Duration,
    /// Whether to fsync the temp file before renaming it into place.
    pub enable_fsync: bool,
}

impl Default for RobustnessConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(10),
            enable_fsync: true,
        }
    }
}

/// Write content atomically to a file with locking.
///
/// Holds an exclusive advisory lock on a `<file>.lock` sidecar, writes the
/// content to a temp file in the same directory and renames it over the
/// target. On any failure the target keeps its previous content and the
/// temp file is removed.
///
/// The sidecar stays on disk after the write. Every writer must lock the
/// same inode, so it is never deleted.
pub fn write_atomic(path: &NormalizedPath, content: &[u8], config: RobustnessConfig) -> Result<()> {
    let native_path = path.to_native();

    if let Some(parent) = native_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let lock_path = sidecar_path(&native_path, "lock");
    let lock_file = acquire_lock(&lock_path, &native_path, config.lock_timeout)?;

    let result = write_via_temp(&native_path, content, config.enable_fsync);

    if let Err(e) = lock_file.unlock() {
        tracing::debug!(path = %lock_path.display(), error = %e, "failed to release lock");
    }
    drop(lock_file);

    result
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

fn sidecar_path(target: &Path, suffix: &str) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".{}", suffix));
    target.with_file_name(name)
}

fn acquire_lock(lock_path: &Path, target: &Path, timeout: Duration) -> Result<File> {
    let lock_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)
        .map_err(|e| Error::io(lock_path, e))?;

    let policy = ExponentialBackoffBuilder::new()
        .with_initial_interval(Duration::from_millis(10))
        .with_max_interval(Duration::from_millis(250))
        .with_max_elapsed_time(Some(timeout))
        .build();

    backoff::retry(policy, || {
        lock_file
            .try_lock_exclusive()
            .map_err(backoff::Error::transient)
    })
    .map_err(|_| Error::LockFailed {
        path: target.to_path_buf(),
    })?;

    Ok(lock_file)
}

fn write_via_temp(target: &Path, content: &[u8], fsync: bool) -> Result<()> {
    let temp_name = format!(
        ".{}.{}.tmp",
        target
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = target.with_file_name(&temp_name);

    let outcome = (|| -> Result<()> {
        let mut temp_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| Error::io(&temp_path, e))?;
        temp_file
            .write_all(content)
            .map_err(|e| Error::io(&temp_path, e))?;
        if fsync {
            temp_file
                .sync_all()
                .map_err(|e| Error::io(&temp_path, e))?;
        }
        drop(temp_file);
        fs::rename(&temp_path, target).map_err(|e| Error::io(target, e))
    })();

    if outcome.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    outcome
}
