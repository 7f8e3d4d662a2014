//! Exclusive lock over a state directory

use fs4::tokio::AsyncFileExt;
use tokio::fs::{self, OpenOptions};
use tracing::debug;

use crate::errors::{Result, SdkError};
use crate::filesys::file::File;

/// Advisory lock held for the duration of a deployment.
/// Released when dropped.
#[derive(Debug)]
pub struct StateLock {
    file: fs::File,
}

impl StateLock {
    /// Block until the lock on `lock_file` is ours
    pub async fn acquire(lock_file: &File) -> Result<Self> {
        if let Some(parent) = lock_file.path().parent() {
            fs::create_dir_all(parent).await?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(lock_file.path())
            .await?;

        file.lock_exclusive().map_err(|e| {
            SdkError::LockError(format!(
                "Failed to lock {}: {}",
                lock_file.path().display(),
                e
            ))
        })?;

        debug!("Acquired state lock {}", lock_file.path().display());
        Ok(Self { file })
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        // closing the handle releases the lock too
        let _ = self.file.unlock();
    }
}
