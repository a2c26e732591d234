//! Repository Traits - The persistence "Port" of Hexagonal Architecture
//!
//! ```text
//! Domain Layer          │  Adapter Layer
//! ──────────────────────┼────────────────────────────
//! trait MirrorRegistry  │  InMemoryMirrorRegistry
//!   fn insert()         │  JsonFileMirrorRegistry
//!   fn find()           │
//! ```

pub mod mirror_registry;
