//! JSON File Registry - Mirrors persisted in a single JSON document
//!
//! Every write replaces the file through a temporary sibling and a rename,
//! so readers never see a half-written registry. Each load-modify-store
//! cycle holds an exclusive lock on `<file>.lock`, which is what keeps
//! separate `gitmirror` processes from overwriting each other's records.

use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use fs4::FileExt;
use mirror_domain::{MirrorRegistry, MirrorRepository, RepositoryError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const FORMAT_VERSION: u32 = 1;

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Error)]
enum RegistryFileError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported registry version {found} in {path}")]
    Version { path: String, found: u32 },
}

impl From<RegistryFileError> for RepositoryError {
    fn from(err: RegistryFileError) -> Self {
        RepositoryError::PersistenceError {
            message: err.to_string(),
        }
    }
}

/// On-disk shape of one mirror
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MirrorRecord {
    identifier: String,
    url: String,
    root_url: String,
    created_at: DateTime<Utc>,
}

impl MirrorRecord {
    fn from_mirror(mirror: &MirrorRepository) -> Self {
        Self {
            identifier: mirror.identifier().to_string(),
            url: mirror.url().to_string(),
            root_url: mirror.root_url().to_string(),
            created_at: Utc::now(),
        }
    }

    fn to_mirror(&self) -> MirrorRepository {
        MirrorRepository::restore(&self.url, &self.identifier, &self.root_url)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct RegistryFile {
    version: u32,
    #[serde(default)]
    mirrors: Vec<MirrorRecord>,
}

impl Default for RegistryFile {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            mirrors: Vec::new(),
        }
    }
}

/// File-backed Mirror Registry
#[derive(Debug, Clone)]
pub struct JsonFileMirrorRegistry {
    path: PathBuf,
}

impl JsonFileMirrorRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn display_path(&self) -> String {
        self.path.display().to_string()
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name: OsString = self.path.clone().into_os_string();
        name.push(suffix);
        PathBuf::from(name)
    }

    fn ensure_parent(&self) -> Result<(), RegistryFileError> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
                .map_err(|source| RegistryFileError::Io {
                    path: parent.display().to_string(),
                    source,
                }),
            _ => Ok(()),
        }
    }

    /// Open `<file>.lock` and hold an advisory lock on it until the returned
    /// handle is dropped.
    fn lock(&self, exclusive: bool) -> Result<File, RegistryFileError> {
        self.ensure_parent()?;
        let lock_path = self.sibling(".lock");
        let io_error = |source| RegistryFileError::Io {
            path: lock_path.display().to_string(),
            source,
        };

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&lock_path)
            .map_err(io_error)?;
        if exclusive {
            FileExt::lock_exclusive(&file).map_err(io_error)?;
        } else {
            FileExt::lock_shared(&file).map_err(io_error)?;
        }
        Ok(file)
    }

    fn load(&self) -> Result<RegistryFile, RegistryFileError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(RegistryFile::default())
            }
            Err(source) => {
                return Err(RegistryFileError::Io {
                    path: self.display_path(),
                    source,
                })
            }
        };

        let file: RegistryFile =
            serde_json::from_str(&content).map_err(|source| RegistryFileError::Json {
                path: self.display_path(),
                source,
            })?;

        if file.version != FORMAT_VERSION {
            return Err(RegistryFileError::Version {
                path: self.display_path(),
                found: file.version,
            });
        }
        Ok(file)
    }

    fn store(&self, file: &RegistryFile) -> Result<(), RegistryFileError> {
        let json = serde_json::to_string_pretty(file).map_err(|source| RegistryFileError::Json {
            path: self.display_path(),
            source,
        })?;

        let tmp = self.sibling(&format!(
            ".{}.{}.tmp",
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        let io_error = |source| RegistryFileError::Io {
            path: tmp.display().to_string(),
            source,
        };

        std::fs::write(&tmp, json).map_err(io_error)?;
        if let Err(source) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(io_error(source));
        }

        debug!(path = %self.path.display(), mirrors = file.mirrors.len(), "registry written");
        Ok(())
    }
}

impl MirrorRegistry for JsonFileMirrorRegistry {
    fn insert(&self, mirror: &MirrorRepository) -> Result<(), RepositoryError> {
        let _lock = self.lock(true)?;
        let mut file = self.load()?;

        if file
            .mirrors
            .iter()
            .any(|record| record.identifier == mirror.identifier())
        {
            return Err(RepositoryError::Conflict {
                identifier: mirror.identifier().to_string(),
            });
        }

        file.mirrors.push(MirrorRecord::from_mirror(mirror));
        file.mirrors.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        Ok(self.store(&file)?)
    }

    fn find(&self, identifier: &str) -> Result<Option<MirrorRepository>, RepositoryError> {
        let _lock = self.lock(false)?;
        Ok(self
            .load()?
            .mirrors
            .iter()
            .find(|record| record.identifier == identifier)
            .map(MirrorRecord::to_mirror))
    }

    fn list(&self) -> Result<Vec<MirrorRepository>, RepositoryError> {
        let _lock = self.lock(false)?;
        Ok(self
            .load()?
            .mirrors
            .iter()
            .map(MirrorRecord::to_mirror)
            .collect())
    }

    fn delete(&self, identifier: &str) -> Result<(), RepositoryError> {
        let _lock = self.lock(true)?;
        let mut file = self.load()?;

        let before = file.mirrors.len();
        file.mirrors.retain(|record| record.identifier != identifier);
        if file.mirrors.len() == before {
            return Err(RepositoryError::NotFound {
                identifier: identifier.to_string(),
            });
        }
        Ok(self.store(&file)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mirror(identifier: &str) -> MirrorRepository {
        MirrorRepository::restore(
            format!("https://example.com/{}.git", identifier),
            identifier,
            format!("/srv/mirrors/1_{}", identifier),
        )
    }

    #[test]
    fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("mirrors.json");

        let registry = JsonFileMirrorRegistry::new(&path);
        assert!(registry.list().unwrap().is_empty());
        registry.insert(&mirror("zeta")).unwrap();
        registry.insert(&mirror("alpha")).unwrap();

        let reopened = JsonFileMirrorRegistry::new(&path);
        let identifiers: Vec<_> = reopened
            .list()
            .unwrap()
            .iter()
            .map(|m| m.identifier().to_string())
            .collect();
        assert_eq!(identifiers, vec!["alpha", "zeta"]);
        assert_eq!(reopened.find("zeta").unwrap(), Some(mirror("zeta")));
    }

    #[test]
    fn test_conflict_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let registry = JsonFileMirrorRegistry::new(dir.path().join("mirrors.json"));

        registry.insert(&mirror("a")).unwrap();
        assert!(matches!(
            registry.insert(&mirror("a")),
            Err(RepositoryError::Conflict { .. })
        ));

        registry.delete("a").unwrap();
        assert!(registry.find("a").unwrap().is_none());
        assert!(matches!(
            registry.delete("a"),
            Err(RepositoryError::NotFound { .. })
        ));
    }

    #[test]
    fn test_corrupt_file_is_a_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mirrors.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = JsonFileMirrorRegistry::new(&path).list().unwrap_err();
        match err {
            RepositoryError::PersistenceError { message } => {
                assert!(message.starts_with("JSON error in"))
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_record_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mirrors.json");
        JsonFileMirrorRegistry::new(&path)
            .insert(&mirror("a"))
            .unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["mirrors"][0]["rootUrl"], "/srv/mirrors/1_a");
        assert!(value["mirrors"][0]["createdAt"].is_string());
    }

    #[test]
    fn test_separate_instances_keep_every_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mirrors.json");

        let handles: Vec<_> = (0..8)
            .map(|writer| {
                let path = path.clone();
                std::thread::spawn(move || {
                    let registry = JsonFileMirrorRegistry::new(path);
                    for n in 0..20 {
                        registry
                            .insert(&mirror(&format!("w{}-{}", writer, n)))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let registry = JsonFileMirrorRegistry::new(&path);
        assert_eq!(registry.list().unwrap().len(), 160);

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty(), "{:?}", leftovers);
    }
}
