//! Durable result store
//!
//! The store is a JSON snapshot of every captured combination:
//!
//! ```json
//! {
//!   "generated_at": "2024-05-01T12:00:00+00:00",
//!   "total_combinations": 1,
//!   "combinations": [
//!     { "key": "a", "modifiers": { "ctrl": true, "shift": false, "alt": false },
//!       "combo": "Ctrl+A", "vk": "0x41", "vk_decimal": 65,
//!       "ascii": 1, "ascii_hex": "0x01", "unicode": 1, "unicode_hex": "0x0001" }
//!   ]
//! }
//! ```
//!
//! Records are unique per combination and written in canonical order.

mod text;

pub use text::{render_text, write_text};

use crate::capture::CaptureRecord;
use crate::keyboard::Combination;
use atomic_write_file::AtomicWriteFile;
use chrono::Utc;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from reading or writing the store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store file not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize store: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("total_combinations is {declared} but {actual} records are present")]
    CountMismatch { declared: usize, actual: usize },
}

/// Persisted store contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub generated_at: String,
    pub total_combinations: usize,
    pub combinations: Vec<CaptureRecord>,
}

impl StoreSnapshot {
    /// Build a snapshot stamped now, with records in canonical order
    pub fn new(mut records: Vec<CaptureRecord>) -> Self {
        sort_canonical(&mut records);
        Self {
            generated_at: Utc::now().to_rfc3339(),
            total_combinations: records.len(),
            combinations: records,
        }
    }

    /// Check the denormalised count against the record list
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.total_combinations != self.combinations.len() {
            return Err(StoreError::CountMismatch {
                declared: self.total_combinations,
                actual: self.combinations.len(),
            });
        }
        Ok(())
    }

    /// Set of combinations present in the snapshot
    pub fn keys(&self) -> HashSet<Combination> {
        self.combinations.iter().map(CaptureRecord::combination).collect()
    }
}

/// Sort records by canonical combination order
pub fn sort_canonical(records: &mut [CaptureRecord]) {
    records.sort_by_cached_key(CaptureRecord::combination);
}

/// Strictly load a snapshot; missing or unparsable files are errors.
pub fn load_snapshot(path: &Path) -> Result<StoreSnapshot, StoreError> {
    let contents = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            StoreError::NotFound(path.to_path_buf())
        } else {
            StoreError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    serde_json::from_str(&contents).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Leniently load existing records.
///
/// A missing file is an empty store. A corrupt file is also treated as empty,
/// with a warning: callers only use this as a hint for what to skip.
pub fn load(path: &Path) -> Vec<CaptureRecord> {
    match load_snapshot(path) {
        Ok(snapshot) => {
            if let Err(e) = snapshot.validate() {
                warn!("{}: {}; using the record list", path.display(), e);
            }
            snapshot.combinations
        }
        Err(StoreError::NotFound(_)) => Vec::new(),
        Err(e) => {
            warn!("{}; treating store as empty", e);
            Vec::new()
        }
    }
}

/// Union of `existing` and `new`, keyed by combination.
///
/// When both sides hold a record for the same combination the one from `new`
/// wins. Duplicates within a side collapse to the later entry. The result is
/// in canonical order.
pub fn merge(existing: Vec<CaptureRecord>, new: Vec<CaptureRecord>) -> Vec<CaptureRecord> {
    let mut by_combo: BTreeMap<Combination, CaptureRecord> = BTreeMap::new();
    for record in existing.into_iter().chain(new) {
        by_combo.insert(record.combination(), record);
    }
    by_combo.into_values().collect()
}

/// Write `records` as a fresh snapshot, atomically replacing `path`.
pub fn save(path: &Path, records: Vec<CaptureRecord>) -> Result<StoreSnapshot, StoreError> {
    let snapshot = StoreSnapshot::new(records);
    snapshot.validate()?;

    let json = serde_json::to_string_pretty(&snapshot)?;
    write_atomic(path, json.as_bytes())?;

    info!(
        "Saved {} combinations to {}",
        snapshot.total_combinations,
        path.display()
    );
    Ok(snapshot)
}

/// Replace `path` with `contents` via temp file and rename
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let write_err = |source: io::Error| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let mut file = AtomicWriteFile::options().open(path).map_err(write_err)?;
    file.write_all(contents).map_err(write_err)?;
    file.commit().map_err(write_err)?;
    Ok(())
}
