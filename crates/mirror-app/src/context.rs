//! AppContext - Dependency injection and wiring
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  AppContext                                                  │
//! │    ├── PathLocks (one set, shared by git + storage)          │
//! │    ├── GitProcessRunner / LsRemoteChecker / GitLogReader     │
//! │    ├── FsLocalStorage / MonotonicClock                       │
//! │    ├── JsonFileMirrorRegistry                                │
//! │    └── MirrorLifecycle (use case)                            │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use anyhow::{anyhow, Context};
use mirror_adapter::{
    FsLocalStorage, GitBinary, GitLogReader, GitProcessRunner, JsonFileMirrorRegistry,
    LsRemoteChecker, MonotonicClock, PathLocks,
};
use mirror_usecase::{MirrorLifecycle, MirrorPorts};
use shared::MirrorSettings;
use tracing::debug;

pub struct AppContext {
    pub settings: MirrorSettings,
    pub lifecycle: MirrorLifecycle,
}

impl AppContext {
    pub fn from_settings(settings: MirrorSettings) -> anyhow::Result<Self> {
        let storage_root = settings
            .storage_root
            .to_str()
            .ok_or_else(|| {
                anyhow!(
                    "storage root {} is not valid UTF-8",
                    settings.storage_root.display()
                )
            })?
            .to_string();

        std::fs::create_dir_all(&settings.storage_root).with_context(|| {
            format!(
                "Failed to create storage root {}",
                settings.storage_root.display()
            )
        })?;

        let git = GitBinary::new(&settings.git_binary);
        let locks = PathLocks::new();

        let ports = MirrorPorts {
            registry: Arc::new(JsonFileMirrorRegistry::new(settings.registry_path())),
            git: Arc::new(GitProcessRunner::new(git.clone(), locks.clone())),
            remote_checker: Arc::new(LsRemoteChecker::new(
                git.clone(),
                settings.remote_check_timeout(),
            )),
            changesets: Arc::new(GitLogReader::new(git)),
            storage: Arc::new(FsLocalStorage::new(locks)),
            stamps: Arc::new(MonotonicClock::new()),
        };

        debug!(
            storage_root = %storage_root,
            registry = %settings.registry_path().display(),
            "context ready"
        );

        Ok(Self {
            lifecycle: MirrorLifecycle::new(storage_root, ports),
            settings,
        })
    }
}
