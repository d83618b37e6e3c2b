//! Write-ahead record of a commit in progress.
//!
//! A commit touches three files (log, HEAD, index). Before touching any of
//! them the commit is written here; the journal is removed once all three
//! are updated. Finding a journal on startup means the previous commit was
//! interrupted and its remaining steps must be replayed.

use crate::error::{Error, Result};
use crate::fsutil::atomic_write;
use crate::models::Commit;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCommit {
    pub commit: Commit,
    /// Log size before the record was appended.
    pub log_offset: u64,
}

pub struct Journal {
    path: PathBuf,
    tmp_dir: PathBuf,
    sync: bool,
}

impl Journal {
    pub fn new<P: AsRef<Path>>(path: P, tmp_dir: P, sync: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            tmp_dir: tmp_dir.as_ref().to_path_buf(),
            sync,
        }
    }

    pub fn write(&self, pending: &PendingCommit) -> Result<()> {
        let data = serde_json::to_vec_pretty(pending)?;
        atomic_write(&self.tmp_dir, &self.path, &data, self.sync)
    }

    pub fn read(&self) -> Result<Option<PendingCommit>> {
        match std::fs::read(&self.path) {
            Ok(data) => Ok(Some(serde_json::from_slice(&data)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io(&self.path)(e)),
        }
    }

    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io(&self.path)(e)),
        }
    }
}
