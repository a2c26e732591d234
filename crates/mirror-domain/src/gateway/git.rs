//! Git ports

use super::GatewayError;
use crate::model::changeset::Changeset;
use crate::model::remote_url::ParsedUrl;

/// Runs the two git operations a mirror needs.
pub trait GitCommandRunner: Send + Sync {
    /// Create a bare clone at `local_path` that tracks `remote_url`.
    ///
    /// Called once per path. On failure nothing may be left at `local_path`.
    fn init(&self, local_path: &str, remote_url: &str) -> Result<(), GatewayError>;

    /// Bring the clone at `local_path` up to date with `remote_url`.
    ///
    /// Repeated calls are safe and converge on the remote's state.
    fn fetch(&self, local_path: &str, remote_url: &str) -> Result<(), GatewayError>;
}

/// Confirms a remote exists and accepts us, without downloading it.
pub trait RemoteChecker: Send + Sync {
    /// Must return within a bounded time; a timeout is an error.
    fn check(&self, url: &ParsedUrl) -> Result<(), GatewayError>;
}

/// Reads commits out of a local clone.
pub trait ChangesetReader: Send + Sync {
    /// A clone with no refs yet yields an empty list.
    fn changesets(&self, local_path: &str) -> Result<Vec<Changeset>, GatewayError>;
}
