use crate::error::{Error, Result};
use crate::fsutil::atomic_write;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// The HEAD file: id of the commit last created or checked out.
pub struct Head {
    path: PathBuf,
    tmp_dir: PathBuf,
    sync: bool,
}

impl Head {
    pub fn new<P: AsRef<Path>>(path: P, tmp_dir: P, sync: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            tmp_dir: tmp_dir.as_ref().to_path_buf(),
            sync,
        }
    }

    /// Current commit id, or `None` before the first commit.
    pub fn read(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => {
                let id = text.trim();
                Ok((!id.is_empty()).then(|| id.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io(&self.path)(e)),
        }
    }

    pub fn write(&self, id: &str) -> Result<()> {
        atomic_write(&self.tmp_dir, &self.path, id.as_bytes(), self.sync)
    }
}
