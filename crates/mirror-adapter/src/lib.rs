//! # gitmirror Adapter Layer
//!
//! External system integrations (Hexagonal Architecture adapters).
//!
//! ## Structure
//!
//! - `git/` - Outbound adapters running the `git` binary
//! - `storage/` - Local filesystem and storage-path stamps
//! - `repository/` - Registry implementations
//! - `locks` - Per-clone mutual exclusion shared by `git/` and `storage/`

pub mod git;
pub mod locks;
pub mod repository;
pub mod storage;

pub use git::{GitBinary, GitError, GitLogReader, GitProcessRunner, LsRemoteChecker};
pub use locks::PathLocks;
pub use repository::{in_memory::InMemoryMirrorRegistry, json_file::JsonFileMirrorRegistry};
pub use storage::{clock::MonotonicClock, fs::FsLocalStorage};
