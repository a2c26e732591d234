//! Cleanup - Guarding the recursive removal of a mirror's clone

use std::path::{Component, Path};

/// Why a destroy left the filesystem untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptyPath,
    FilesystemRoot,
    /// Contains `..`, so the text says nothing about where it resolves
    ParentTraversal,
    /// Nothing (or not a directory) at `root_url`
    NotADirectory,
}

/// What the cleanup step did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    Removed { path: String },
    Skipped(SkipReason),
}

/// Reject paths that must never be handed to a recursive delete.
///
/// The existence check is left to the storage port.
pub fn check_removable(root_url: &str) -> Result<(), SkipReason> {
    if root_url.trim().is_empty() {
        return Err(SkipReason::EmptyPath);
    }
    let path = Path::new(root_url);
    if path.components().any(|c| c == Component::ParentDir) {
        return Err(SkipReason::ParentTraversal);
    }
    if path.has_root() && path.parent().is_none() {
        return Err(SkipReason::FilesystemRoot);
    }
    Ok(())
}
