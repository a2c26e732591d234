//! Mirror Registry - Abstract persistence for mirrors
//!
//! The registry is keyed by identifier. Writing a record is the "commit" of
//! the creation pipeline; removing it is the last step of a destroy.

use crate::model::mirror::MirrorRepository;

/// Errors that can occur during registry operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// No mirror with this identifier
    NotFound { identifier: String },
    /// Another mirror already uses this identifier
    Conflict { identifier: String },
    /// Failed to persist
    PersistenceError { message: String },
}

impl core::fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RepositoryError::NotFound { identifier } => {
                write!(f, "Mirror not found: {}", identifier)
            }
            RepositoryError::Conflict { identifier } => {
                write!(f, "Mirror identifier already taken: {}", identifier)
            }
            RepositoryError::PersistenceError { message } => {
                write!(f, "Persistence error: {}", message)
            }
        }
    }
}

impl std::error::Error for RepositoryError {}

/// Mirror Registry Trait
///
/// Implementations are shared between request handlers, so every method
/// takes `&self` and implementations synchronise internally.
pub trait MirrorRegistry: Send + Sync {
    /// Persist a new mirror. Fails with `Conflict` if the identifier is used.
    fn insert(&self, mirror: &MirrorRepository) -> Result<(), RepositoryError>;

    /// Find a mirror by identifier
    fn find(&self, identifier: &str) -> Result<Option<MirrorRepository>, RepositoryError>;

    /// All mirrors, ordered by identifier
    fn list(&self) -> Result<Vec<MirrorRepository>, RepositoryError>;

    /// Remove a mirror record. Fails with `NotFound` if it is absent.
    fn delete(&self, identifier: &str) -> Result<(), RepositoryError>;

    /// Check if an identifier is in use
    fn exists(&self, identifier: &str) -> Result<bool, RepositoryError> {
        Ok(self.find(identifier)?.is_some())
    }

    fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.list()?.len())
    }
}
