//! Git adapters
//!
//! Every type here shells out to the system `git` binary through
//! [`GitBinary`], with terminal prompts disabled so a missing credential
//! fails fast instead of hanging.

mod command;
mod log_reader;
mod remote_check;
mod runner;

pub use command::{GitBinary, GitError};
pub use log_reader::GitLogReader;
pub use remote_check::LsRemoteChecker;
pub use runner::GitProcessRunner;
