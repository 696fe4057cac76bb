//! File-backed alert ledger.

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::{AlertKey, LedgerError};

/// Set of alert keys already sent, persisted as a sorted JSON array.
///
/// The ledger owns its in-memory snapshot. `add` is the only mutator and
/// rewrites the whole file before returning.
#[derive(Debug)]
pub struct AlertLedger {
    path: PathBuf,
    keys: BTreeSet<AlertKey>,
}

impl AlertLedger {
    /// Create an empty ledger that will persist to `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            keys: BTreeSet::new(),
        }
    }

    /// Load the ledger from `path`.
    ///
    /// A missing, unreadable or corrupt file yields an empty ledger.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No ledger file yet, starting empty");
                return Self::empty(path);
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to read ledger, starting empty"
                );
                return Self::empty(path);
            }
        };

        match serde_json::from_str::<Vec<AlertKey>>(&contents) {
            Ok(keys) => {
                let keys: BTreeSet<AlertKey> = keys.into_iter().collect();
                info!(path = %path.display(), alerts = keys.len(), "Loaded alert ledger");
                Self { path, keys }
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Ledger file is not a JSON list of keys, starting empty"
                );
                Self::empty(path)
            }
        }
    }

    pub fn contains(&self, key: &AlertKey) -> bool {
        self.keys.contains(key)
    }

    /// Insert `key` and rewrite the ledger file.
    ///
    /// Returns `Ok(false)` without touching the file if the key was already
    /// present. On a write error the key stays in the in-memory set.
    pub fn add(&mut self, key: AlertKey) -> Result<bool, LedgerError> {
        if !self.keys.insert(key) {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Write the full set to disk, sorted.
    ///
    /// Writes to a sibling temp file first and renames it over the target.
    pub fn persist(&self) -> Result<(), LedgerError> {
        let json = serde_json::to_string_pretty(&self.keys)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| LedgerError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let tmp_path = temp_path(&self.path);
        fs::write(&tmp_path, json).map_err(|source| LedgerError::Io {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|source| LedgerError::Io {
            path: self.path.clone(),
            source,
        })?;

        debug!(path = %self.path.display(), alerts = self.keys.len(), "Ledger saved");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &AlertKey> {
        self.keys.iter()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "ledger".into());
    name.push(".tmp");
    path.with_file_name(name)
}
