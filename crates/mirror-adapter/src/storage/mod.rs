//! Storage Adapters - Local filesystem and storage-path stamps

pub mod clock;
pub mod fs;
