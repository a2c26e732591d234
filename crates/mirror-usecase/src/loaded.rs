//! LoadedMirror - One mirror held for the duration of a request
//!
//! The `fetched` flag lives here, not on the entity. Whoever loads a mirror
//! owns the flag for as long as they hold the value; loading the same mirror
//! again starts with a fresh flag.

use mirror_domain::{
    Changeset, ChangesetReader, GatewayError, GitCommandRunner, MirrorRepository,
};
use tracing::{debug, info, warn};

/// What a call to [`LoadedMirror::fetch`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The remote was fetched into the clone
    Fetched,
    /// The fetch ran and failed; the clone keeps whatever it had before
    Failed { message: String },
    /// This instance already fetched once; nothing ran
    AlreadyFetched,
}

impl FetchOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, FetchOutcome::Failed { .. })
    }
}

/// Changesets read after a fetch attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangesetListing {
    pub fetch: FetchOutcome,
    pub changesets: Vec<Changeset>,
}

#[derive(Debug, Clone)]
pub struct LoadedMirror {
    mirror: MirrorRepository,
    fetched: bool,
}

impl LoadedMirror {
    pub fn new(mirror: MirrorRepository) -> Self {
        Self {
            mirror,
            fetched: false,
        }
    }

    pub fn mirror(&self) -> &MirrorRepository {
        &self.mirror
    }

    pub fn is_fetched(&self) -> bool {
        self.fetched
    }

    pub fn into_mirror(self) -> MirrorRepository {
        self.mirror
    }

    /// Fetch from the remote, at most once for this instance.
    ///
    /// A failed fetch still counts as the one fetch. Failures are logged and
    /// returned, never raised.
    pub fn fetch(&mut self, git: &dyn GitCommandRunner) -> FetchOutcome {
        if self.fetched {
            debug!(identifier = %self.mirror.identifier(), "already fetched, skipping");
            return FetchOutcome::AlreadyFetched;
        }
        self.fetched = true;

        info!(
            identifier = %self.mirror.identifier(),
            root_url = %self.mirror.root_url(),
            "fetching mirror"
        );

        match git.fetch(self.mirror.root_url(), self.mirror.url()) {
            Ok(()) => FetchOutcome::Fetched,
            Err(err) => {
                warn!(
                    identifier = %self.mirror.identifier(),
                    root_url = %self.mirror.root_url(),
                    error = %err,
                    "fetch failed"
                );
                FetchOutcome::Failed {
                    message: err.message,
                }
            }
        }
    }

    /// Fetch (if this instance has not yet) and read the clone's changesets.
    ///
    /// The read happens even when the fetch failed.
    pub fn fetch_changesets(
        &mut self,
        git: &dyn GitCommandRunner,
        reader: &dyn ChangesetReader,
    ) -> Result<ChangesetListing, GatewayError> {
        let fetch = self.fetch(git);
        let changesets = reader.changesets(self.mirror.root_url())?;
        Ok(ChangesetListing { fetch, changesets })
    }
}
