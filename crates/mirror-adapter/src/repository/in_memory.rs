//! In-Memory Registry Implementation
//!
//! Useful for testing and for a single-process deployment.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use mirror_domain::{MirrorRegistry, MirrorRepository, RepositoryError};

/// In-memory Mirror Registry
///
/// Thread-safe implementation using RwLock.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMirrorRegistry {
    mirrors: Arc<RwLock<BTreeMap<String, MirrorRepository>>>,
}

impl InMemoryMirrorRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(kind: &str) -> RepositoryError {
    RepositoryError::PersistenceError {
        message: format!("Failed to acquire {} lock", kind),
    }
}

impl MirrorRegistry for InMemoryMirrorRegistry {
    fn insert(&self, mirror: &MirrorRepository) -> Result<(), RepositoryError> {
        let mut mirrors = self.mirrors.write().map_err(|_| lock_error("write"))?;
        if mirrors.contains_key(mirror.identifier()) {
            return Err(RepositoryError::Conflict {
                identifier: mirror.identifier().to_string(),
            });
        }
        mirrors.insert(mirror.identifier().to_string(), mirror.clone());
        Ok(())
    }

    fn find(&self, identifier: &str) -> Result<Option<MirrorRepository>, RepositoryError> {
        let mirrors = self.mirrors.read().map_err(|_| lock_error("read"))?;
        Ok(mirrors.get(identifier).cloned())
    }

    fn list(&self) -> Result<Vec<MirrorRepository>, RepositoryError> {
        let mirrors = self.mirrors.read().map_err(|_| lock_error("read"))?;
        Ok(mirrors.values().cloned().collect())
    }

    fn delete(&self, identifier: &str) -> Result<(), RepositoryError> {
        let mut mirrors = self.mirrors.write().map_err(|_| lock_error("write"))?;
        mirrors
            .remove(identifier)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound {
                identifier: identifier.to_string(),
            })
    }

    fn count(&self) -> Result<usize, RepositoryError> {
        let mirrors = self.mirrors.read().map_err(|_| lock_error("read"))?;
        Ok(mirrors.len())
    }
}
