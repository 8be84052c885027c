//! The record store: a single JSON document holding the entire election state.
//!
//! Every access re-reads the backing file, and every mutation is a complete
//! load, mutate, save cycle. Nothing is cached between calls, so the file is
//! always the single source of truth.

use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{candidate::Candidate, results::PastWinner, vote::Vote, voter::Voter};

/// The persisted election state.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Document {
    pub users: Vec<Voter>,
    pub candidates: Vec<Candidate>,
    pub votes: Vec<Vote>,
    pub past_winners: Vec<PastWinner>,
    pub election_start: Option<DateTime<Utc>>,
    pub election_end: Option<DateTime<Utc>>,
}

/// A handle on the backing file. Cloning the handle shares the same
/// mutation lock.
#[derive(Debug, Clone)]
pub struct Store {
    path: Arc<PathBuf>,
    lock: Arc<Mutex<()>>,
}

impl Store {
    /// Create a handle on the document at `path`. The file need not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
            lock: Default::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document.
    ///
    /// A missing, empty, unreadable, or corrupt file is treated as a first run
    /// and yields an empty document.
    pub fn load(&self) -> Document {
        let contents = match fs::read_to_string(self.path()) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No election data at {}, starting fresh", self.path.display());
                return Document::default();
            }
            Err(e) => {
                warn!(
                    "Failed to read election data from {}: {e}; using empty data",
                    self.path.display()
                );
                return Document::default();
            }
        };
        if contents.trim().is_empty() {
            return Document::default();
        }
        serde_json::from_str(&contents).unwrap_or_else(|e| {
            warn!(
                "Election data at {} is corrupt ({e}); using empty data",
                self.path.display()
            );
            Document::default()
        })
    }

    /// Overwrite the backing file with `document`.
    ///
    /// The new contents are written to a sibling file which then replaces the
    /// original, so readers never observe a partial write.
    pub fn save(&self, document: &Document) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let contents = serde_json::to_vec_pretty(document)?;
        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, contents)?;
        fs::rename(&tmp_path, self.path())?;
        Ok(())
    }

    /// Run a read-only query against a freshly loaded document.
    pub fn read<T>(&self, query: impl FnOnce(&Document) -> T) -> T {
        query(&self.load())
    }

    /// Load the document, apply `mutate`, and save the result.
    ///
    /// Nothing is saved if `mutate` fails. Updates through handles sharing
    /// this store's lock are applied one at a time.
    ///
    /// The file I/O blocks the calling thread while the lock is held. Routes
    /// call this from Rocket's workers directly, which is fine for a data file
    /// of a few hundred voters.
    pub fn update<T>(&self, mutate: impl FnOnce(&mut Document) -> Result<T>) -> Result<T> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut document = self.load();
        let output = mutate(&mut document)?;
        if let Err(e) = self.save(&document) {
            error!(
                "Failed to save election data to {}: {e}",
                self.path.display()
            );
            return Err(e);
        }
        Ok(output)
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }

    /// Log a one-line summary of the current contents.
    pub fn log_summary(&self) {
        let document = self.load();
        info!(
            "Election data at {}: {} voters, {} candidates, {} votes, {} past elections",
            self.path.display(),
            document.users.len(),
            document.candidates.len(),
            document.votes.len(),
            document.past_winners.len(),
        );
    }
}

/// Test helpers.
#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// A store over a fresh file in the system temp directory.
    /// The file is removed when the guard is dropped.
    pub struct TempStore(pub Store);

    impl TempStore {
        pub fn new() -> Self {
            let random: u64 = rand::random();
            let path = std::env::temp_dir().join(format!("student-election-{random:016x}.json"));
            Self(Store::open(path))
        }
    }

    impl std::ops::Deref for TempStore {
        type Target = Store;

        fn deref(&self) -> &Self::Target {
            &self.0
        }
    }

    impl Drop for TempStore {
        fn drop(&mut self) {
            let _ = fs::remove_file(self.0.path());
            let _ = fs::remove_file(self.0.tmp_path());
        }
    }
}
