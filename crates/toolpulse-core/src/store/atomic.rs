//! Crash-safe file replacement
//!
//! Content goes to a sibling temp file, is synced, then renamed over the
//! destination. Readers see either the old or the new file, never a torn one.

use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::StoreError;

/// Write `content` to `path` via `temp_path` + rename
pub async fn write_atomic(path: &Path, temp_path: &Path, content: &[u8]) -> Result<(), StoreError> {
    let write_err = |source| StoreError::FileWrite {
        path: temp_path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| StoreError::FileWrite {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    let mut file = fs::File::create(temp_path).await.map_err(write_err)?;
    file.write_all(content).await.map_err(write_err)?;
    file.sync_all().await.map_err(write_err)?;
    drop(file);

    if let Err(source) = fs::rename(temp_path, path).await {
        let _ = fs::remove_file(temp_path).await;
        return Err(StoreError::FileWrite {
            path: path.to_path_buf(),
            source,
        });
    }

    Ok(())
}
