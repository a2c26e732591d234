//! # gitmirror Shared
//!
//! Settings, error types and logging setup used by the gitmirror binary.

pub mod config;
pub mod error;
pub mod logging;

// Re-exports
pub use config::*;
pub use error::*;
