//! # gitmirror Use Case Layer
//!
//! Application-specific business rules. This layer runs the mirror's
//! lifecycle as explicit, ordered pipelines over the domain's ports:
//!
//! ```text
//! create:  validate url → allocate path → validate identifier → git init → commit
//! after:   fetch (at most once per LoadedMirror) → list changesets
//! destroy: remove clone directory → delete record
//! ```

pub mod lifecycle;
pub mod loaded;

#[cfg(test)]
mod testing;

pub use mirror_domain;

pub use lifecycle::{CreateError, DestroyError, MirrorLifecycle, MirrorPorts};
pub use loaded::{ChangesetListing, FetchOutcome, LoadedMirror};
