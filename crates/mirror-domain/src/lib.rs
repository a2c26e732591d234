//! # gitmirror Domain Layer
//!
//! Pure business rules for read-only git mirrors, with zero external dependencies.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Domain Layer (This Crate)                     │
//! │  ┌─────────────────────────────────────────────────────────────┐│
//! │  │  model/      - Entity & Value Objects                       ││
//! │  │  repository/ - Registry port (persistence)                  ││
//! │  │  gateway/    - Git, remote check and storage ports          ││
//! │  │  service/    - Domain services (PathAllocator)              ││
//! │  └─────────────────────────────────────────────────────────────┘│
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing in here spawns a process or touches the filesystem. The adapters
//! crate does that behind the traits declared in `repository/` and `gateway/`.

pub mod gateway;
pub mod model;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use model::{
    changeset::Changeset,
    cleanup::{check_removable, CleanupOutcome, SkipReason},
    mirror::{is_valid_identifier, MirrorDraft, MirrorRepository, NewMirror},
    remote_url::{parse_url, ParsedUrl, UrlError},
    stamp::StampToken,
    validation::{Field, FieldError, RejectionKind, ValidationErrors},
};

pub use repository::mirror_registry::{MirrorRegistry, RepositoryError};

pub use gateway::{
    git::{ChangesetReader, GitCommandRunner, RemoteChecker},
    storage::{LocalStorage, StampSource},
    GatewayError,
};

pub use service::path_allocator::{Allocation, PathAllocator};
