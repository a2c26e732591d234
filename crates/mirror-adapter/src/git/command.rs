use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::Duration;

use mirror_domain::GatewayError;
use thiserror::Error;
use tracing::debug;

/// Errors raised while running git
#[derive(Debug, Error)]
pub enum GitError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git {command} failed ({status}): {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("git {command} timed out after {}s", .timeout.as_secs_f32())]
    TimedOut { command: String, timeout: Duration },

    #[error("{path} already exists")]
    AlreadyExists { path: String },

    #[error("no clone at {path}")]
    MissingClone { path: String },

    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<GitError> for GatewayError {
    fn from(err: GitError) -> Self {
        GatewayError::new(err.to_string())
    }
}

/// The git executable and the environment every invocation gets
#[derive(Debug, Clone)]
pub struct GitBinary {
    program: PathBuf,
}

impl Default for GitBinary {
    fn default() -> Self {
        Self::new("git")
    }
}

impl GitBinary {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// A `git` command with prompts disabled and stdin closed
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.env("GIT_TERMINAL_PROMPT", "0");
        if std::env::var_os("GIT_SSH_COMMAND").is_none() {
            cmd.env("GIT_SSH_COMMAND", "ssh -o BatchMode=yes");
        }
        cmd.stdin(Stdio::null());
        cmd
    }

    /// Run git to completion. A non-zero exit becomes [`GitError::Failed`].
    pub fn run<I, S>(&self, label: &str, args: I) -> Result<Output, GitError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = self.command();
        cmd.args(args).stdout(Stdio::piped()).stderr(Stdio::piped());

        debug!(command = label, "spawning git");

        let output = cmd.output().map_err(|source| self.spawn_error(source))?;

        if !output.status.success() {
            return Err(GitError::Failed {
                command: label.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output)
    }

    pub(crate) fn spawn_error(&self, source: std::io::Error) -> GitError {
        GitError::Spawn {
            program: self.program.display().to_string(),
            source,
        }
    }
}

/// True when a `git` binary can be run; tests skip themselves otherwise.
#[cfg(test)]
pub(crate) fn git_available() -> bool {
    GitBinary::default().run("--version", ["--version"]).is_ok()
}
