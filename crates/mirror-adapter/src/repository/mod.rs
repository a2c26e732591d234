//! Persistence Adapters - Registry implementations
//!
//! These implement the registry trait from mirror-domain.

pub mod in_memory;
pub mod json_file;
