//! Known hubs trust store.
//!
//! Maps an authority (`ip:port`) to the certificate fingerprint the operator
//! accepted for it. Backed by a single JSON file; a missing file means no hub
//! has been trusted yet.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StorageError;

/// File name of the trust store inside the cache directory.
pub const KNOWN_HUBS_FILE: &str = "known_hubs.json";

/// A hub whose certificate has been accepted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownHub {
    /// Authority string the entry is keyed by.
    pub hostname: String,
    /// Certificate fingerprint, uppercase colon-separated hex.
    pub fingerprint: String,
}

/// Trust store service.
///
/// Loaded once per invocation and written back whenever an entry changes.
#[derive(Debug)]
pub struct TrustStore {
    path: PathBuf,
    hubs: BTreeMap<String, KnownHub>,
}

impl TrustStore {
    /// Load the trust store at `path`.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();

        let hubs = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                StorageError::TrustStoreCorrupt {
                    path: path.display().to_string(),
                    message: e.to_string(),
                }
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(StorageError::TrustStoreCorrupt {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })
            }
        };

        debug!(path = %path.display(), entries = hubs.len(), "loaded known hubs");

        Ok(Self { path, hubs })
    }

    /// Load `known_hubs.json` from `dir`, creating the directory if needed.
    pub fn open_in(dir: &Path) -> Result<Self, StorageError> {
        fs::create_dir_all(dir)
            .map_err(|e| StorageError::DirectoryAccess(format!("{}: {}", dir.display(), e)))?;
        Self::load(dir.join(KNOWN_HUBS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up the trusted entry for an authority.
    pub fn lookup(&self, authority: &str) -> Option<&KnownHub> {
        self.hubs.get(authority)
    }

    /// Trust `fingerprint` for `authority` and persist the store.
    ///
    /// The in-memory entry is updated even when writing the file fails.
    pub fn record(&mut self, authority: &str, fingerprint: &str) -> Result<(), StorageError> {
        self.hubs.insert(
            authority.to_string(),
            KnownHub {
                hostname: authority.to_string(),
                fingerprint: fingerprint.to_string(),
            },
        );
        self.persist()
    }

    /// Forget an authority. Returns the removed entry, if any.
    pub fn remove(&mut self, authority: &str) -> Result<Option<KnownHub>, StorageError> {
        let removed = self.hubs.remove(authority);
        if removed.is_some() {
            self.persist()?;
        }
        Ok(removed)
    }

    pub fn iter(&self) -> impl Iterator<Item = &KnownHub> {
        self.hubs.values()
    }

    pub fn len(&self) -> usize {
        self.hubs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hubs.is_empty()
    }

    /// Write to a sibling temp file and rename it over the store so a crash
    /// mid-write leaves the previous contents intact.
    fn persist(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(StorageError::Io)?;
        }

        let content = serde_json::to_string_pretty(&self.hubs)?;
        let tmp = self.path.with_extension("json.tmp");

        fs::write(&tmp, content).map_err(StorageError::Io)?;
        fs::rename(&tmp, &self.path).map_err(StorageError::Io)?;

        debug!(path = %self.path.display(), "saved known hubs");
        Ok(())
    }
}
