//! LsRemoteChecker - Reachability check via `git ls-remote`
//!
//! `ls-remote` performs the protocol handshake and lists refs without
//! transferring objects. The child is killed once the timeout expires.

use std::process::Stdio;
use std::time::Duration;

use mirror_domain::{GatewayError, ParsedUrl, RemoteChecker};
use tokio::process::Command;
use tracing::debug;

use super::command::{GitBinary, GitError};

#[derive(Debug, Clone)]
pub struct LsRemoteChecker {
    git: GitBinary,
    timeout: Duration,
}

impl LsRemoteChecker {
    pub fn new(git: GitBinary, timeout: Duration) -> Self {
        Self { git, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn ls_remote(&self, url: &str) -> Result<(), GitError> {
        let mut cmd = Command::from(self.git.command());
        cmd.arg("ls-remote")
            .arg("--heads")
            .arg("--")
            .arg(url)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(%url, timeout = ?self.timeout, "checking remote");

        let child = cmd.spawn().map_err(|source| self.git.spawn_error(source))?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| GitError::TimedOut {
                command: "ls-remote".to_string(),
                timeout: self.timeout,
            })?
            .map_err(|source| GitError::Io {
                path: url.to_string(),
                source,
            })?;

        if output.status.success() {
            return Ok(());
        }

        Err(GitError::Failed {
            command: "ls-remote".to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }

    /// Drive the async check on a private current-thread runtime, since the
    /// port is synchronous and is called from blocking threads.
    fn check_blocking(&self, url: &str) -> Result<(), GitError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|source| GitError::Io {
                path: url.to_string(),
                source,
            })?;
        runtime.block_on(self.ls_remote(url))
    }
}

impl RemoteChecker for LsRemoteChecker {
    fn check(&self, url: &ParsedUrl) -> Result<(), GatewayError> {
        self.check_blocking(url.as_str()).map_err(GatewayError::from)
    }
}
