//! In-process fakes for the domain ports, used by this crate's tests.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use mirror_domain::{
    Changeset, ChangesetReader, GatewayError, GitCommandRunner, LocalStorage, ParsedUrl,
    RemoteChecker, StampSource, StampToken,
};

#[derive(Debug, Default)]
pub struct FakeStorage {
    dirs: Mutex<BTreeSet<String>>,
    removed: Mutex<Vec<String>>,
}

impl FakeStorage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_dir(&self, path: &str) {
        self.dirs.lock().unwrap().insert(path.to_string());
    }

    pub fn dirs(&self) -> Vec<String> {
        self.dirs.lock().unwrap().iter().cloned().collect()
    }

    pub fn removed(&self) -> Vec<String> {
        self.removed.lock().unwrap().clone()
    }
}

impl LocalStorage for FakeStorage {
    fn exists(&self, path: &str) -> bool {
        self.dirs.lock().unwrap().contains(path)
    }

    fn is_dir(&self, path: &str) -> bool {
        self.exists(path)
    }

    fn remove_dir_all(&self, path: &str) -> Result<(), GatewayError> {
        let mut dirs = self.dirs.lock().unwrap();
        if !dirs.remove(path) {
            return Err(GatewayError::new(format!("no such directory: {}", path)));
        }
        let prefix = format!("{}/", path);
        dirs.retain(|d| !d.starts_with(&prefix));
        self.removed.lock().unwrap().push(path.to_string());
        Ok(())
    }
}

/// Records calls; `init` creates the directory in the attached storage.
#[derive(Debug, Default)]
pub struct FakeGit {
    storage: Option<Arc<FakeStorage>>,
    init_error: Option<String>,
    fetch_error: Option<String>,
    inits: Mutex<Vec<(String, String)>>,
    fetches: Mutex<Vec<(String, String)>>,
}

impl FakeGit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_storage(mut self, storage: Arc<FakeStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// `init` creates the directory and then reports this error
    pub fn failing_init(mut self, message: &str) -> Self {
        self.init_error = Some(message.to_string());
        self
    }

    pub fn failing_fetch(mut self, message: &str) -> Self {
        self.fetch_error = Some(message.to_string());
        self
    }

    pub fn init_calls(&self) -> Vec<(String, String)> {
        self.inits.lock().unwrap().clone()
    }

    pub fn fetch_calls(&self) -> Vec<(String, String)> {
        self.fetches.lock().unwrap().clone()
    }
}

impl GitCommandRunner for FakeGit {
    fn init(&self, local_path: &str, remote_url: &str) -> Result<(), GatewayError> {
        self.inits
            .lock()
            .unwrap()
            .push((local_path.to_string(), remote_url.to_string()));
        if let Some(storage) = &self.storage {
            storage.add_dir(local_path);
        }
        match &self.init_error {
            Some(message) => Err(GatewayError::new(message.clone())),
            None => Ok(()),
        }
    }

    fn fetch(&self, local_path: &str, remote_url: &str) -> Result<(), GatewayError> {
        self.fetches
            .lock()
            .unwrap()
            .push((local_path.to_string(), remote_url.to_string()));
        match &self.fetch_error {
            Some(message) => Err(GatewayError::new(message.clone())),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Default)]
pub struct FakeChecker {
    error: Option<String>,
    calls: AtomicUsize,
}

impl FakeChecker {
    pub fn accepting() -> Self {
        Self::default()
    }

    pub fn rejecting(message: &str) -> Self {
        Self {
            error: Some(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RemoteChecker for FakeChecker {
    fn check(&self, _url: &ParsedUrl) -> Result<(), GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.error {
            Some(message) => Err(GatewayError::new(message.clone())),
            None => Ok(()),
        }
    }
}

/// Counts up from a fixed millisecond timestamp
#[derive(Debug)]
pub struct FakeStamps {
    next: AtomicU64,
}

impl FakeStamps {
    pub const FIRST: u64 = 20240101000000000;

    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(Self::FIRST),
        }
    }
}

impl StampSource for FakeStamps {
    fn next_stamp(&self) -> StampToken {
        let value = self.next.fetch_add(1, Ordering::SeqCst);
        StampToken::new(value.to_string()).unwrap()
    }
}

#[derive(Debug, Default)]
pub struct FakeChangesets {
    revisions: Vec<String>,
}

impl FakeChangesets {
    pub fn with_revisions(revisions: &[&str]) -> Self {
        Self {
            revisions: revisions.iter().map(|r| r.to_string()).collect(),
        }
    }
}

impl ChangesetReader for FakeChangesets {
    fn changesets(&self, _local_path: &str) -> Result<Vec<Changeset>, GatewayError> {
        Ok(self
            .revisions
            .iter()
            .map(|revision| Changeset {
                revision: revision.clone(),
                author: "Ada".to_string(),
                committed_on: "2024-01-01T00:00:00+00:00".to_string(),
                summary: "commit".to_string(),
            })
            .collect())
    }
}
