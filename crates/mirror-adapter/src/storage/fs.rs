//! FsLocalStorage - The real filesystem

use std::io::ErrorKind;
use std::path::Path;

use mirror_domain::{GatewayError, LocalStorage};
use tracing::debug;

use crate::locks::PathLocks;

/// Filesystem access for the lifecycle.
///
/// Removal takes the same per-clone lock as [`crate::GitProcessRunner`], so a
/// destroy waits for a running fetch of that clone.
#[derive(Debug, Clone, Default)]
pub struct FsLocalStorage {
    locks: PathLocks,
}

impl FsLocalStorage {
    pub fn new(locks: PathLocks) -> Self {
        Self { locks }
    }
}

impl LocalStorage for FsLocalStorage {
    fn exists(&self, path: &str) -> bool {
        Path::new(path).symlink_metadata().is_ok()
    }

    fn is_dir(&self, path: &str) -> bool {
        Path::new(path).is_dir()
    }

    fn remove_dir_all(&self, path: &str) -> Result<(), GatewayError> {
        let result = self.locks.with_lock(path, || std::fs::remove_dir_all(path));
        self.locks.forget(path);

        match result {
            Ok(()) => {
                debug!(%path, "directory removed");
                Ok(())
            }
            // Already gone, e.g. removed by a concurrent destroy
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(GatewayError::new(format!("failed to remove {}: {}", path, err))),
        }
    }
}
