//! MirrorLifecycle - Create, load and destroy mirrors
//!
//! Each pipeline is a fixed sequence of steps. A step either succeeds or
//! adds field messages; later steps look at what earlier steps reported
//! instead of sharing mutable error state.
//!
//! ```text
//! create
//!   1. validate url       empty → skip | malformed → InvalidUrl | local → NotRemote | check fails → RemoteUnreachable
//!   2. allocate           identifier suggestion + root_url (retries on an occupied path)
//!   3. validate record    url present, identifier present / well-formed / unused
//!   4. init               git init; failure → InitFailed, directory discarded
//!   5. commit             registry insert; failure → directory discarded
//! destroy
//!   1. cleanup directory  guarded: skip empty, root, `..` and missing paths
//!   2. delete record
//! ```

use std::sync::Arc;

use mirror_domain::model::mirror::IDENTIFIER_MAX_LENGTH;
use mirror_domain::{
    check_removable, is_valid_identifier, parse_url, ChangesetReader, CleanupOutcome,
    FieldError, GatewayError, GitCommandRunner, LocalStorage, MirrorDraft, MirrorRegistry,
    MirrorRepository, NewMirror, ParsedUrl, PathAllocator, RejectionKind, RemoteChecker,
    RepositoryError, SkipReason, StampSource, ValidationErrors,
};
use tracing::{debug, info, warn};

use crate::loaded::{ChangesetListing, FetchOutcome, LoadedMirror};

/// How many stamps to try before giving up on finding a free path
pub const MAX_ALLOCATION_ATTEMPTS: usize = 16;

/// Everything the lifecycle talks to
#[derive(Clone)]
pub struct MirrorPorts {
    pub registry: Arc<dyn MirrorRegistry>,
    pub git: Arc<dyn GitCommandRunner>,
    pub remote_checker: Arc<dyn RemoteChecker>,
    pub changesets: Arc<dyn ChangesetReader>,
    pub storage: Arc<dyn LocalStorage>,
    pub stamps: Arc<dyn StampSource>,
}

/// Why a creation request did not produce a mirror
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateError {
    /// Field-level validation messages; nothing was persisted
    Rejected(ValidationErrors),
    /// The registry itself failed
    Registry(RepositoryError),
}

impl core::fmt::Display for CreateError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CreateError::Rejected(errors) => write!(f, "Mirror rejected: {}", errors),
            CreateError::Registry(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for CreateError {}

/// Why a destroy stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestroyError {
    /// The clone could not be removed; the record is kept
    Cleanup { path: String, error: GatewayError },
    Registry(RepositoryError),
}

impl core::fmt::Display for DestroyError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DestroyError::Cleanup { path, error } => {
                write!(f, "Failed to remove {}: {}", path, error)
            }
            DestroyError::Registry(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for DestroyError {}

/// The mirror lifecycle orchestrator
///
/// Cheap to clone; clones share the same ports.
#[derive(Clone)]
pub struct MirrorLifecycle {
    storage_root: String,
    allocator: PathAllocator,
    ports: MirrorPorts,
}

impl MirrorLifecycle {
    pub fn new(storage_root: impl Into<String>, ports: MirrorPorts) -> Self {
        Self {
            storage_root: storage_root.into(),
            allocator: PathAllocator::new(),
            ports,
        }
    }

    pub fn storage_root(&self) -> &str {
        &self.storage_root
    }

    // ========== Create ==========

    /// Run the creation pipeline up to and including the commit.
    ///
    /// The returned mirror has not been fetched. Callers trigger the fetch
    /// once this returns, typically off the request path.
    pub fn create(&self, request: NewMirror) -> Result<LoadedMirror, CreateError> {
        let mut draft = MirrorDraft::new(request);
        let mut errors = ValidationErrors::new();

        let parsed = self.validate_url(draft.url(), &mut errors);

        if let Some(parsed) = &parsed {
            if errors.is_empty() {
                self.allocate(&mut draft, parsed, &mut errors);
            }
        }

        self.validate_record(&draft, &mut errors)
            .map_err(CreateError::Registry)?;

        if !errors.is_empty() {
            debug!(url = %draft.url(), %errors, "mirror rejected");
            return Err(CreateError::Rejected(errors));
        }

        if let Err(err) = self.ports.git.init(draft.root_url(), draft.url()) {
            self.discard_directory(draft.root_url());
            return Err(CreateError::Rejected(
                FieldError::url(RejectionKind::InitFailed, err.message).into(),
            ));
        }

        let mirror = draft.into_mirror();
        if let Err(err) = self.ports.registry.insert(&mirror) {
            self.discard_directory(mirror.root_url());
            return Err(match err {
                RepositoryError::Conflict { .. } => CreateError::Rejected(
                    FieldError::identifier(
                        RejectionKind::IdentifierTaken,
                        "has already been taken",
                    )
                    .into(),
                ),
                other => CreateError::Registry(other),
            });
        }

        info!(
            identifier = %mirror.identifier(),
            root_url = %mirror.root_url(),
            "mirror created"
        );
        Ok(LoadedMirror::new(mirror))
    }

    /// Step 1. Returns the parsed URL when there is one to work with.
    fn validate_url(&self, url: &str, errors: &mut ValidationErrors) -> Option<ParsedUrl> {
        if url.is_empty() {
            return None;
        }

        let parsed = match parse_url(url) {
            Ok(parsed) => parsed,
            Err(err) => {
                errors.add(FieldError::url(RejectionKind::InvalidUrl, err.to_string()));
                return None;
            }
        };

        if !parsed.is_remote() {
            errors.add(FieldError::url(
                RejectionKind::NotRemote,
                "should be remote url",
            ));
            return None;
        }

        if let Err(err) = self.ports.remote_checker.check(&parsed) {
            errors.add(FieldError::url(RejectionKind::RemoteUnreachable, err.message));
        }

        Some(parsed)
    }

    /// Step 2. Fills in the identifier suggestion and a free `root_url`.
    fn allocate(&self, draft: &mut MirrorDraft, parsed: &ParsedUrl, errors: &mut ValidationErrors) {
        for _ in 0..MAX_ALLOCATION_ATTEMPTS {
            let stamp = self.ports.stamps.next_stamp();
            let allocation = self.allocator.allocate(&self.storage_root, parsed, &stamp);

            if self.ports.storage.exists(&allocation.root_url) {
                debug!(root_url = %allocation.root_url, "storage path taken, retrying");
                continue;
            }

            draft.suggest_identifier(&allocation.identifier_suggestion);
            draft.assign_root_url(allocation.root_url);
            return;
        }

        errors.add(FieldError::url(
            RejectionKind::InitFailed,
            format!("could not allocate a free storage path under {}", self.storage_root),
        ));
    }

    /// Step 3. The checks the registry applies to every record.
    fn validate_record(
        &self,
        draft: &MirrorDraft,
        errors: &mut ValidationErrors,
    ) -> Result<(), RepositoryError> {
        if draft.url().is_empty() {
            errors.add(FieldError::url(RejectionKind::UrlBlank, "can't be blank"));
        }

        let identifier = draft.identifier();
        if identifier.is_empty() {
            errors.add(FieldError::identifier(
                RejectionKind::IdentifierBlank,
                "can't be blank",
            ));
        } else if identifier.len() > IDENTIFIER_MAX_LENGTH || !is_valid_identifier(identifier) {
            errors.add(FieldError::identifier(
                RejectionKind::IdentifierInvalid,
                "is invalid",
            ));
        } else if self.ports.registry.exists(identifier)? {
            errors.add(FieldError::identifier(
                RejectionKind::IdentifierTaken,
                "has already been taken",
            ));
        }

        Ok(())
    }

    /// Best-effort removal of a directory left behind by a failed creation.
    fn discard_directory(&self, root_url: &str) {
        if check_removable(root_url).is_err() || !self.ports.storage.exists(root_url) {
            return;
        }
        if let Err(err) = self.ports.storage.remove_dir_all(root_url) {
            warn!(%root_url, error = %err, "failed to discard directory of rejected mirror");
        }
    }

    // ========== Load / Fetch ==========

    pub fn load(&self, identifier: &str) -> Result<Option<LoadedMirror>, RepositoryError> {
        Ok(self.ports.registry.find(identifier)?.map(LoadedMirror::new))
    }

    pub fn list(&self) -> Result<Vec<MirrorRepository>, RepositoryError> {
        self.ports.registry.list()
    }

    pub fn fetch(&self, loaded: &mut LoadedMirror) -> FetchOutcome {
        loaded.fetch(self.ports.git.as_ref())
    }

    pub fn changesets(&self, loaded: &mut LoadedMirror) -> Result<ChangesetListing, GatewayError> {
        loaded.fetch_changesets(self.ports.git.as_ref(), self.ports.changesets.as_ref())
    }

    // ========== Destroy ==========

    /// Remove the clone, then the record.
    pub fn destroy(&self, mirror: &MirrorRepository) -> Result<CleanupOutcome, DestroyError> {
        let outcome = self
            .remove_clone(mirror.root_url())
            .map_err(|error| DestroyError::Cleanup {
                path: mirror.root_url().to_string(),
                error,
            })?;

        self.ports
            .registry
            .delete(mirror.identifier())
            .map_err(DestroyError::Registry)?;

        info!(identifier = %mirror.identifier(), ?outcome, "mirror destroyed");
        Ok(outcome)
    }

    pub fn destroy_by_identifier(&self, identifier: &str) -> Result<CleanupOutcome, DestroyError> {
        let mirror = self
            .ports
            .registry
            .find(identifier)
            .map_err(DestroyError::Registry)?
            .ok_or_else(|| {
                DestroyError::Registry(RepositoryError::NotFound {
                    identifier: identifier.to_string(),
                })
            })?;
        self.destroy(&mirror)
    }

    fn remove_clone(&self, root_url: &str) -> Result<CleanupOutcome, GatewayError> {
        if let Err(reason) = check_removable(root_url) {
            debug!(%root_url, ?reason, "cleanup skipped");
            return Ok(CleanupOutcome::Skipped(reason));
        }
        if !self.ports.storage.is_dir(root_url) {
            debug!(%root_url, "cleanup skipped, no directory");
            return Ok(CleanupOutcome::Skipped(SkipReason::NotADirectory));
        }

        self.ports.storage.remove_dir_all(root_url)?;
        Ok(CleanupOutcome::Removed {
            path: root_url.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeChangesets, FakeChecker, FakeGit, FakeStamps, FakeStorage};
    use mirror_adapter::{
        FsLocalStorage, GitBinary, GitLogReader, GitProcessRunner, InMemoryMirrorRegistry,
        MonotonicClock, PathLocks,
    };
    use mirror_domain::Field;
    use std::path::Path;

    struct Harness {
        lifecycle: MirrorLifecycle,
        git: Arc<FakeGit>,
        checker: Arc<FakeChecker>,
        storage: Arc<FakeStorage>,
        registry: Arc<InMemoryMirrorRegistry>,
    }

    fn harness_with(git: FakeGit, checker: FakeChecker) -> Harness {
        let storage = FakeStorage::new();
        let git = Arc::new(git.with_storage(storage.clone()));
        let checker = Arc::new(checker);
        let registry = Arc::new(InMemoryMirrorRegistry::new());

        let ports = MirrorPorts {
            registry: registry.clone(),
            git: git.clone(),
            remote_checker: checker.clone(),
            changesets: Arc::new(FakeChangesets::with_revisions(&["abc", "def"])),
            storage: storage.clone(),
            stamps: Arc::new(FakeStamps::new()),
        };

        Harness {
            lifecycle: MirrorLifecycle::new("/var/mirrors", ports),
            git,
            checker,
            storage,
            registry,
        }
    }

    fn harness() -> Harness {
        harness_with(FakeGit::new(), FakeChecker::accepting())
    }

    fn rejected(result: Result<LoadedMirror, CreateError>) -> ValidationErrors {
        match result {
            Err(CreateError::Rejected(errors)) => errors,
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_create_scenario() {
        let h = harness();
        let loaded = h
            .lifecycle
            .create(NewMirror::new("https://example.com/group/my-repo.git"))
            .unwrap();

        let mirror = loaded.mirror();
        assert_eq!(mirror.identifier(), "my-repo");
        assert_eq!(
            mirror.root_url(),
            format!("/var/mirrors/{}_example.com_group_my-repo.git", FakeStamps::FIRST)
        );
        assert!(!loaded.is_fetched());
        assert_eq!(h.storage.dirs(), vec![mirror.root_url().to_string()]);
        assert_eq!(
            h.git.init_calls(),
            vec![(
                mirror.root_url().to_string(),
                "https://example.com/group/my-repo.git".to_string()
            )]
        );
        assert!(h.git.fetch_calls().is_empty());
        assert_eq!(h.registry.count().unwrap(), 1);
    }

    #[test]
    fn test_malformed_url_rejected_without_directory() {
        let h = harness();
        let errors = rejected(h.lifecycle.create(NewMirror::new("https://exa mple.com/r.git")));

        assert!(errors.has_kind(RejectionKind::InvalidUrl));
        assert_eq!(errors.on(Field::Url).len(), 1);
        assert!(h.storage.dirs().is_empty());
        assert!(h.git.init_calls().is_empty());
        assert_eq!(h.checker.calls(), 0);
    }

    #[test]
    fn test_local_url_rejected() {
        let h = harness();
        let errors = rejected(h.lifecycle.create(NewMirror::new("/local/path/to/repo")));

        assert_eq!(errors.on(Field::Url), vec!["should be remote url"]);
        assert!(errors.has_kind(RejectionKind::NotRemote));
        assert!(h.storage.dirs().is_empty());
        assert_eq!(h.checker.calls(), 0);
    }

    #[test]
    fn test_unreachable_remote_rejected_with_checker_message() {
        let h = harness_with(
            FakeGit::new(),
            FakeChecker::rejecting("fatal: repository not found"),
        );
        let errors = rejected(h.lifecycle.create(NewMirror::new("https://example.com/missing.git")));

        assert_eq!(errors.on(Field::Url), vec!["fatal: repository not found"]);
        assert!(h.storage.dirs().is_empty());
        assert!(h.git.init_calls().is_empty());
    }

    #[test]
    fn test_init_failure_leaves_nothing_behind() {
        let h = harness_with(
            FakeGit::new().failing_init("git init --bare failed"),
            FakeChecker::accepting(),
        );
        let errors = rejected(h.lifecycle.create(NewMirror::new("https://example.com/a.git")));

        assert!(errors.has_kind(RejectionKind::InitFailed));
        assert_eq!(errors.on(Field::Url), vec!["git init --bare failed"]);
        assert!(h.storage.dirs().is_empty());
        assert_eq!(h.storage.removed().len(), 1);
        assert_eq!(h.registry.count().unwrap(), 0);
    }

    #[test]
    fn test_empty_url_is_blank() {
        let h = harness();
        let errors = rejected(h.lifecycle.create(NewMirror::new("").with_identifier("x")));

        assert!(errors.has_kind(RejectionKind::UrlBlank));
        assert_eq!(h.checker.calls(), 0);
        assert!(h.git.init_calls().is_empty());
    }

    #[test]
    fn test_unusable_suggestion_leaves_identifier_for_validation() {
        let h = harness();
        let errors = rejected(h.lifecycle.create(NewMirror::new("https://example.com/My.Repo.git")));

        assert!(errors.has_kind(RejectionKind::IdentifierBlank));
        assert!(h.git.init_calls().is_empty());
        assert!(h.storage.dirs().is_empty());
    }

    #[test]
    fn test_explicit_invalid_identifier_rejected() {
        let h = harness();
        let errors = rejected(
            h.lifecycle
                .create(NewMirror::new("https://example.com/a.git").with_identifier("Bad Name")),
        );
        assert_eq!(errors.on(Field::Identifier), vec!["is invalid"]);
    }

    #[test]
    fn test_identifier_taken() {
        let h = harness();
        h.lifecycle
            .create(NewMirror::new("https://example.com/a.git"))
            .unwrap();
        let errors = rejected(h.lifecycle.create(NewMirror::new("https://other.org/a.git")));

        assert!(errors.has_kind(RejectionKind::IdentifierTaken));
        assert_eq!(h.git.init_calls().len(), 1);
        assert_eq!(h.storage.dirs().len(), 1);
    }

    #[test]
    fn test_root_urls_unique_for_same_remote() {
        let h = harness();
        let a = h
            .lifecycle
            .create(NewMirror::new("https://example.com/r.git").with_identifier("first"))
            .unwrap();
        let b = h
            .lifecycle
            .create(NewMirror::new("https://example.com/r.git").with_identifier("second"))
            .unwrap();

        assert_ne!(a.mirror().root_url(), b.mirror().root_url());
        assert_eq!(h.storage.dirs().len(), 2);
    }

    #[test]
    fn test_occupied_path_gets_next_stamp() {
        let h = harness();
        let taken = format!("/var/mirrors/{}_example.com_r.git", FakeStamps::FIRST);
        h.storage.add_dir(&taken);

        let loaded = h
            .lifecycle
            .create(NewMirror::new("https://example.com/r.git"))
            .unwrap();

        assert_eq!(
            loaded.mirror().root_url(),
            format!("/var/mirrors/{}_example.com_r.git", FakeStamps::FIRST + 1)
        );
    }

    #[test]
    fn test_fetch_twice_after_create_reaches_git_once() {
        let h = harness();
        let mut loaded = h
            .lifecycle
            .create(NewMirror::new("https://example.com/group/my-repo.git"))
            .unwrap();

        assert_eq!(h.lifecycle.fetch(&mut loaded), FetchOutcome::Fetched);
        assert_eq!(h.lifecycle.fetch(&mut loaded), FetchOutcome::AlreadyFetched);

        let listing = h.lifecycle.changesets(&mut loaded).unwrap();
        assert_eq!(listing.changesets.len(), 2);
        assert_eq!(h.git.fetch_calls().len(), 1);
    }

    #[test]
    fn test_load_gives_fresh_fetch_flag() {
        let h = harness();
        let mut created = h
            .lifecycle
            .create(NewMirror::new("https://example.com/a.git"))
            .unwrap();
        h.lifecycle.fetch(&mut created);

        let mut loaded = h.lifecycle.load("a").unwrap().unwrap();
        assert!(!loaded.is_fetched());
        h.lifecycle.fetch(&mut loaded);
        assert_eq!(h.git.fetch_calls().len(), 2);
        assert!(h.lifecycle.load("missing").unwrap().is_none());
    }

    #[test]
    fn test_destroy_removes_only_its_directory() {
        let h = harness();
        let a = h
            .lifecycle
            .create(NewMirror::new("https://example.com/a.git"))
            .unwrap();
        let b = h
            .lifecycle
            .create(NewMirror::new("https://example.com/b.git"))
            .unwrap();

        let outcome = h.lifecycle.destroy(a.mirror()).unwrap();

        assert_eq!(
            outcome,
            CleanupOutcome::Removed {
                path: a.mirror().root_url().to_string()
            }
        );
        assert_eq!(h.storage.dirs(), vec![b.mirror().root_url().to_string()]);
        assert!(h.registry.find("a").unwrap().is_none());
        assert!(h.registry.find("b").unwrap().is_some());
    }

    #[test]
    fn test_destroy_guards() {
        let h = harness();
        let cases = [
            ("empty", "", SkipReason::EmptyPath),
            ("root", "/", SkipReason::FilesystemRoot),
            ("escape", "/var/mirrors/..", SkipReason::ParentTraversal),
            ("gone", "/var/mirrors/1_gone", SkipReason::NotADirectory),
        ];

        for (identifier, root_url, reason) in cases {
            let mirror = MirrorRepository::restore("https://example.com/x.git", identifier, root_url);
            h.registry.insert(&mirror).unwrap();

            let outcome = h.lifecycle.destroy(&mirror).unwrap();
            assert_eq!(outcome, CleanupOutcome::Skipped(reason));
            assert!(h.registry.find(identifier).unwrap().is_none());
        }
        assert!(h.storage.removed().is_empty());
    }

    #[test]
    fn test_destroy_by_unknown_identifier() {
        let h = harness();
        assert_eq!(
            h.lifecycle.destroy_by_identifier("nope"),
            Err(DestroyError::Registry(RepositoryError::NotFound {
                identifier: "nope".to_string()
            }))
        );
    }

    fn git_available() -> bool {
        GitBinary::default().run("--version", ["--version"]).is_ok()
    }

    #[test]
    fn test_create_and_destroy_on_disk() {
        if !git_available() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("mirrors");
        let locks = PathLocks::new();

        let ports = MirrorPorts {
            registry: Arc::new(InMemoryMirrorRegistry::new()),
            git: Arc::new(GitProcessRunner::new(GitBinary::default(), locks.clone())),
            remote_checker: Arc::new(FakeChecker::accepting()),
            changesets: Arc::new(GitLogReader::default()),
            storage: Arc::new(FsLocalStorage::new(locks)),
            stamps: Arc::new(MonotonicClock::new()),
        };
        let lifecycle = MirrorLifecycle::new(root.to_str().unwrap(), ports);

        let a = lifecycle
            .create(NewMirror::new("https://example.com/group/a.git"))
            .unwrap();
        let b = lifecycle
            .create(NewMirror::new("https://example.com/group/b.git"))
            .unwrap();
        let a_path = Path::new(a.mirror().root_url()).to_path_buf();
        let b_path = Path::new(b.mirror().root_url()).to_path_buf();

        assert!(a_path.starts_with(&root));
        assert!(a_path.join("HEAD").is_file());
        assert!(b_path.join("HEAD").is_file());
        let config = std::fs::read_to_string(a_path.join("config")).unwrap();
        assert!(config.contains("https://example.com/group/a.git"));

        let outcome = lifecycle.destroy(a.mirror()).unwrap();

        assert_eq!(
            outcome,
            CleanupOutcome::Removed {
                path: a.mirror().root_url().to_string()
            }
        );
        assert!(!a_path.exists());
        assert!(b_path.join("HEAD").is_file());
        assert!(root.is_dir());
        let remaining: Vec<_> = lifecycle
            .list()
            .unwrap()
            .iter()
            .map(|m| m.identifier().to_string())
            .collect();
        assert_eq!(remaining, vec!["b"]);
    }
}
