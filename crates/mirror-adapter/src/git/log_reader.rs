//! GitLogReader - Changesets from a bare clone via `git log`

use mirror_domain::{Changeset, ChangesetReader, GatewayError};

use super::command::{GitBinary, GitError};

/// Unit separator between fields of one log line
const FIELD_SEP: char = '\u{1f}';
const LOG_FORMAT: &str = "--format=%H%x1f%an%x1f%aI%x1f%s";

#[derive(Debug, Clone, Default)]
pub struct GitLogReader {
    git: GitBinary,
}

impl GitLogReader {
    pub fn new(git: GitBinary) -> Self {
        Self { git }
    }

    fn read(&self, local_path: &str) -> Result<Vec<Changeset>, GitError> {
        // `git log --all` errors on a clone without refs; that's just empty.
        let refs = self.git.run(
            "for-each-ref",
            ["-C", local_path, "for-each-ref", "--count=1", "--format=%(refname)"],
        )?;
        if String::from_utf8_lossy(&refs.stdout).trim().is_empty() {
            return Ok(Vec::new());
        }

        let log = self.git.run(
            "log",
            ["-C", local_path, "log", "--all", "--date-order", LOG_FORMAT],
        )?;
        Ok(parse_log(&String::from_utf8_lossy(&log.stdout)))
    }
}

impl ChangesetReader for GitLogReader {
    fn changesets(&self, local_path: &str) -> Result<Vec<Changeset>, GatewayError> {
        self.read(local_path).map_err(GatewayError::from)
    }
}

fn parse_log(stdout: &str) -> Vec<Changeset> {
    stdout
        .lines()
        .filter_map(|line| {
            let mut fields = line.splitn(4, FIELD_SEP);
            let revision = fields.next()?.trim();
            if revision.is_empty() {
                return None;
            }
            Some(Changeset {
                revision: revision.to_string(),
                author: fields.next().unwrap_or_default().to_string(),
                committed_on: fields.next().unwrap_or_default().to_string(),
                summary: fields.next().unwrap_or_default().to_string(),
            })
        })
        .collect()
}
