//! Advisory partition lock shared across processes
//!
//! Protocol:
//! - the lock is held while `<partition>.lock` exists; its body is the holder's PID
//! - acquire = create-if-absent, retried every `retry_interval` up to `timeout`
//! - a lock file older than `timeout` is abandoned and removed before retrying
//!
//! Readers never take the lock.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::StoreError;

/// RAII guard for a partition lock
///
/// Prefer [`PartitionLock::release`]; dropping the guard removes the lock file
/// synchronously as a fallback.
#[derive(Debug)]
pub struct PartitionLock {
    path: PathBuf,
    released: bool,
}

impl PartitionLock {
    /// Acquire the lock at `path`, waiting at most `timeout`
    pub async fn acquire(
        path: PathBuf,
        timeout: Duration,
        retry_interval: Duration,
    ) -> Result<Self, StoreError> {
        let started = Instant::now();
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;

            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(mut file) => {
                    let pid = std::process::id().to_string();
                    if let Err(source) = file.write_all(pid.as_bytes()).await {
                        let _ = fs::remove_file(&path).await;
                        return Err(StoreError::LockIo { path, source });
                    }
                    debug!(path = %path.display(), attempts, "Acquired partition lock");
                    return Ok(Self {
                        path,
                        released: false,
                    });
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    match lock_age(&path).await {
                        // Holder released between our attempt and the stat
                        None => continue,
                        Some(age) if age > timeout => {
                            let holder = read_holder(&path).await;
                            warn!(
                                path = %path.display(),
                                age_ms = age.as_millis() as u64,
                                holder = %holder,
                                "Removing stale partition lock"
                            );
                            match fs::remove_file(&path).await {
                                Ok(()) => continue,
                                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                                Err(source) => return Err(StoreError::LockIo { path, source }),
                            }
                        }
                        Some(_) => {}
                    }
                }
                Err(source) => return Err(StoreError::LockIo { path, source }),
            }

            if started.elapsed() >= timeout {
                warn!(path = %path.display(), attempts, "Timed out waiting for partition lock");
                return Err(StoreError::LockTimeout { path, timeout });
            }

            tokio::time::sleep(retry_interval).await;
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the lock file
    pub async fn release(mut self) -> Result<(), StoreError> {
        self.released = true;
        match fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!(path = %self.path.display(), "Released partition lock");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %self.path.display(), "Lock file already gone on release");
                Ok(())
            }
            Err(source) => Err(StoreError::LockIo {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

impl Drop for PartitionLock {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "Failed to release partition lock");
            }
        }
    }
}

/// Age of the lock file; `None` if it no longer exists.
/// A modification time in the future counts as a fresh lock.
async fn lock_age(path: &Path) -> Option<Duration> {
    let metadata = fs::metadata(path).await.ok()?;
    let modified = metadata.modified().ok()?;
    Some(
        SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO),
    )
}

async fn read_holder(path: &Path) -> String {
    fs::read_to_string(path)
        .await
        .map(|pid| pid.trim().to_string())
        .unwrap_or_else(|_| "unknown".to_string())
}
