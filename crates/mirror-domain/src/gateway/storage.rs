//! Storage ports

use super::GatewayError;
use crate::model::stamp::StampToken;

/// The slice of the local filesystem the lifecycle needs.
pub trait LocalStorage: Send + Sync {
    /// Anything (file or directory) exists at `path`
    fn exists(&self, path: &str) -> bool;

    fn is_dir(&self, path: &str) -> bool;

    /// Recursively delete the directory at `path`.
    fn remove_dir_all(&self, path: &str) -> Result<(), GatewayError>;
}

/// Hands out storage path prefixes.
///
/// Tokens from one source are strictly increasing, so no two calls in the
/// same process return the same token.
pub trait StampSource: Send + Sync {
    fn next_stamp(&self) -> StampToken;
}
