//! GitProcessRunner - `init` and `fetch` for bare clones

use std::path::Path;

use mirror_domain::{GatewayError, GitCommandRunner};
use tracing::{debug, warn};

use super::command::{GitBinary, GitError};
use crate::locks::PathLocks;

/// Runs `git init --bare` / `git fetch` under a per-clone lock.
#[derive(Debug, Clone, Default)]
pub struct GitProcessRunner {
    git: GitBinary,
    locks: PathLocks,
}

impl GitProcessRunner {
    pub fn new(git: GitBinary, locks: PathLocks) -> Self {
        Self { git, locks }
    }

    fn init_clone(&self, local_path: &str, remote_url: &str) -> Result<(), GitError> {
        if Path::new(local_path).exists() {
            return Err(GitError::AlreadyExists {
                path: local_path.to_string(),
            });
        }

        let result = self
            .git
            .run("init --bare", ["init", "--bare", "--quiet", local_path])
            .and_then(|_| {
                self.git.run(
                    "remote add",
                    [
                        "-C",
                        local_path,
                        "remote",
                        "add",
                        "--mirror=fetch",
                        "--",
                        "origin",
                        remote_url,
                    ],
                )
            });

        if let Err(err) = result {
            remove_partial_clone(local_path);
            return Err(err);
        }

        debug!(%local_path, "bare clone initialised");
        Ok(())
    }

    fn fetch_clone(&self, local_path: &str, remote_url: &str) -> Result<(), GitError> {
        if !Path::new(local_path).is_dir() {
            return Err(GitError::MissingClone {
                path: local_path.to_string(),
            });
        }

        self.git.run(
            "fetch",
            [
                "-C",
                local_path,
                "fetch",
                "--prune",
                "--force",
                "--quiet",
                "--",
                remote_url,
                "+refs/*:refs/*",
            ],
        )?;

        debug!(%local_path, "fetch complete");
        Ok(())
    }
}

impl GitCommandRunner for GitProcessRunner {
    fn init(&self, local_path: &str, remote_url: &str) -> Result<(), GatewayError> {
        self.locks
            .with_lock(local_path, || self.init_clone(local_path, remote_url))
            .map_err(GatewayError::from)
    }

    fn fetch(&self, local_path: &str, remote_url: &str) -> Result<(), GatewayError> {
        self.locks
            .with_lock(local_path, || self.fetch_clone(local_path, remote_url))
            .map_err(GatewayError::from)
    }
}

fn remove_partial_clone(local_path: &str) {
    let path = Path::new(local_path);
    if !path.exists() {
        return;
    }
    if let Err(err) = std::fs::remove_dir_all(path) {
        warn!(%local_path, error = %err, "failed to remove partially initialised clone");
    }
}
