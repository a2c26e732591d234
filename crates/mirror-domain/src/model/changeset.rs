//! Changeset - One commit as seen in a mirror's local clone

/// A commit read back from the bare clone after a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Changeset {
    /// Full commit hash
    pub revision: String,
    pub author: String,
    /// Commit date, ISO 8601 as reported by git
    pub committed_on: String,
    /// First line of the commit message
    pub summary: String,
}
