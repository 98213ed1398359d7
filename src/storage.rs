use crate::domain::Transaction;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to serialize transactions: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write '{key}': {source}")]
    Write {
        key: String,
        #[source]
        source: io::Error,
    },
}

/// Named text blobs that survive between sessions.
pub trait BlobStore {
    fn get(&self, key: &str) -> io::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> io::Result<()>;
}

/// One file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl BlobStore for FileBlobStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        write_atomic(&self.path_for(key), value)
    }
}

fn write_atomic(path: &Path, data: &str) -> io::Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, data)?;
    fs::rename(&tmp, path)
}

#[cfg(test)]
pub use memory::MemoryBlobStore;


#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// Nothing was persisted yet.
    Missing,
    Restored,
    /// The blob existed but could not be read; the list was reset to empty.
    Recovered { reason: String },
}

#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub transactions: Vec<Transaction>,
    pub status: LoadStatus,
}

impl LoadOutcome {
    fn empty(status: LoadStatus) -> Self {
        Self {
            transactions: Vec::new(),
            status,
        }
    }
}

/// Maps the transaction list onto a single blob.
pub struct StorageAdapter<B: BlobStore> {
    backend: B,
    key: String,
}

impl<B: BlobStore> StorageAdapter<B> {
    pub fn new(backend: B, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn load(&self) -> LoadOutcome {
        let raw = match self.backend.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return LoadOutcome::empty(LoadStatus::Missing),
            Err(err) => {
                warn!(key = %self.key, error = %err, "failed to read stored transactions; starting empty");
                return LoadOutcome::empty(LoadStatus::Recovered {
                    reason: err.to_string(),
                });
            }
        };

        match serde_json::from_str::<Vec<Transaction>>(&raw) {
            Ok(transactions) => {
                debug!(key = %self.key, count = transactions.len(), "loaded transactions");
                LoadOutcome {
                    transactions,
                    status: LoadStatus::Restored,
                }
            }
            Err(err) => {
                warn!(key = %self.key, error = %err, "stored transactions are malformed; starting empty");
                LoadOutcome::empty(LoadStatus::Recovered {
                    reason: err.to_string(),
                })
            }
        }
    }

    pub fn save(&self, transactions: &[Transaction]) -> Result<(), StorageError> {
        let json = serde_json::to_string(transactions)?;
        self.backend
            .set(&self.key, &json)
            .map_err(|source| StorageError::Write {
                key: self.key.clone(),
                source,
            })
    }
}
