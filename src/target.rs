use std::io::ErrorKind;
use std::path::Path;

use crate::error::MountError;

/// Checks that `dir` can be mounted over: it exists, is a directory and is empty.
///
/// Read-only; nothing is created or removed.
pub async fn ensure_mountable(dir: &Path) -> Result<(), MountError> {
    tracing::debug!("Checking dir exists: {}", dir.display());

    let metadata = match tokio::fs::metadata(dir).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(MountError::NotFound(dir.to_path_buf()));
        }
        Err(source) => {
            return Err(MountError::Inspect {
                path: dir.to_path_buf(),
                source,
            });
        }
    };

    if !metadata.is_dir() {
        return Err(MountError::NotAMountableTarget(dir.to_path_buf()));
    }

    let inspect = |source| MountError::Inspect {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = tokio::fs::read_dir(dir).await.map_err(inspect)?;
    if entries.next_entry().await.map_err(inspect)?.is_some() {
        return Err(MountError::DirectoryNotEmpty(dir.to_path_buf()));
    }

    Ok(())
}
