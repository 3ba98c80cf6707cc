//! Load-once dataset memoization.
//!
//! A cached dataset is keyed by the identity of its source:
//!
//! - files: canonical path + byte length + modification time
//! - in-memory bytes: SHA-256 of the content
//!
//! A file whose length or mtime changed is a miss, and the stale entry is
//! replaced. Datasets are handed out as `Arc<Dataset>` and never mutated.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use log::debug;
use sha2::{Digest, Sha256};

use crate::domain::Dataset;
use crate::error::DatasetError;
use crate::io::ingest::{load_dataset, load_dataset_from_path};

/// What a file looked like when it was loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FileStamp {
    len: u64,
    modified: Option<SystemTime>,
}

impl FileStamp {
    fn of(path: &Path) -> Result<Self, DatasetError> {
        let meta = fs::metadata(path)
            .map_err(|e| DatasetError::unavailable(format!("cannot stat '{}': {e}", path.display())))?;
        Ok(Self {
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

#[derive(Debug, Default)]
pub struct DatasetCache {
    files: HashMap<PathBuf, (FileStamp, Arc<Dataset>)>,
    blobs: HashMap<String, Arc<Dataset>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `path`, reusing the cached dataset while the file is unchanged.
    pub fn load_path(&mut self, path: &Path) -> Result<Arc<Dataset>, DatasetError> {
        let key = canonical(path)?;
        let stamp = FileStamp::of(&key)?;

        if let Some((cached, dataset)) = self.files.get(&key) {
            if *cached == stamp {
                debug!("dataset cache hit: {}", key.display());
                return Ok(Arc::clone(dataset));
            }
            debug!("dataset cache stale: {} changed on disk", key.display());
        } else {
            debug!("dataset cache miss: {}", key.display());
        }

        let dataset = Arc::new(load_dataset_from_path(&key)?);
        self.files.insert(key, (stamp, Arc::clone(&dataset)));
        Ok(dataset)
    }

    /// Load CSV content held in memory, keyed by its SHA-256 digest.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<Arc<Dataset>, DatasetError> {
        let key = content_key(bytes);
        if let Some(dataset) = self.blobs.get(&key) {
            debug!("dataset cache hit: sha256 {}", &key[..12]);
            return Ok(Arc::clone(dataset));
        }

        debug!("dataset cache miss: sha256 {}", &key[..12]);
        let dataset = Arc::new(load_dataset(bytes)?);
        self.blobs.insert(key, Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Drop the entry for `path`. Returns whether one existed.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        let key = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        self.files.remove(&key).is_some()
    }

    pub fn clear(&mut self) {
        self.files.clear();
        self.blobs.clear();
    }

    pub fn len(&self) -> usize {
        self.files.len() + self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Lowercase hex SHA-256 of `bytes`.
pub fn content_key(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn canonical(path: &Path) -> Result<PathBuf, DatasetError> {
    fs::canonicalize(path).map_err(|e| DatasetError::unavailable(format!("cannot open '{}': {e}", path.display())))
}
