use crate::error::{Error, Result};
use crate::fsutil::atomic_write;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Ordered set of filenames staged for the next commit, persisted one per
/// line.
pub struct StagingIndex {
    path: PathBuf,
    tmp_dir: PathBuf,
    sync: bool,
}

impl StagingIndex {
    pub fn new<P: AsRef<Path>>(path: P, tmp_dir: P, sync: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            tmp_dir: tmp_dir.as_ref().to_path_buf(),
            sync,
        }
    }

    /// Staged filenames in insertion order. A missing index file is an empty
    /// index.
    pub fn list(&self) -> Result<Vec<String>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::io(&self.path)(e)),
        };

        Ok(text
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    pub fn contains(&self, name: &str) -> Result<bool> {
        Ok(self.list()?.iter().any(|staged| staged == name))
    }

    pub fn add(&self, name: &str) -> Result<()> {
        let mut names = self.list()?;
        if names.iter().any(|staged| staged == name) {
            return Err(Error::AlreadyStaged(name.to_string()));
        }

        names.push(name.to_string());
        self.write(&names)?;
        debug!("Staged {} ({} file(s) staged)", name, names.len());
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        self.write(&[])
    }

    fn write(&self, names: &[String]) -> Result<()> {
        let mut text = String::new();
        for name in names {
            text.push_str(name);
            text.push('\n');
        }
        atomic_write(&self.tmp_dir, &self.path, text.as_bytes(), self.sync)
    }
}
