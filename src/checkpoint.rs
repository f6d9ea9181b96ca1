//! Checkpoint log of fully extracted archives
//!
//! The log is a plain text file, one archive URL per line, appended to only
//! when an archive's extraction run reaches normal completion. Interrupted
//! archives are therefore reprocessed from scratch on the next run. The
//! trade is at-least-once processing for a trivially recoverable format.

use crate::{Result, WarcflowError};
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Append-only record of fully processed archive URLs
pub struct CheckpointLog {
    path: PathBuf,
    completed: Mutex<HashSet<String>>,
}

impl CheckpointLog {
    /// Opens the checkpoint log, reading any existing entries into memory.
    /// A missing file is an empty log.
    pub fn open(path: &Path) -> Result<Self> {
        let completed = match std::fs::read_to_string(path) {
            Ok(content) => content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path: path.to_path_buf(),
            completed: Mutex::new(completed),
        })
    }

    /// Returns true if the archive URL was fully extracted by an earlier run
    pub fn contains(&self, url: &str) -> bool {
        self.completed.lock().unwrap().contains(url)
    }

    /// Number of completed archives in the log
    pub fn len(&self) -> usize {
        self.completed.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.completed.lock().unwrap().len() == 0
    }

    /// Records an archive as fully extracted.
    ///
    /// The write is flushed before the in-memory set is updated; a failed
    /// write surfaces as an error and the URL stays unmarked, so the worst
    /// case is reprocessing, never a silently lost completion.
    pub fn append(&self, url: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| WarcflowError::Checkpoint {
                path: self.path.clone(),
                source,
            })?;

        writeln!(file, "{}", url).map_err(|source| WarcflowError::Checkpoint {
            path: self.path.clone(),
            source,
        })?;

        self.completed.lock().unwrap().insert(url.to_string());
        Ok(())
    }
}
