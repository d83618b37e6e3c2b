//! Repository lock.
//!
//! Mutating commands hold an exclusive OS lock on `.myvcs/lock`; reading
//! commands hold a shared one so they never see a half-appended log record.
//! Acquisition is non-blocking and fails with [`Error::Locked`] when another
//! process holds a conflicting lock. The lock is released on drop.

use crate::error::{Error, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::Path;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    Shared,
    Exclusive,
}

#[derive(Debug)]
pub struct RepoLock {
    file: File,
}

impl RepoLock {
    pub fn acquire(path: &Path, mode: LockMode) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(Error::io(path))?;

        let locked = match mode {
            LockMode::Shared => FileExt::try_lock_shared(&file),
            LockMode::Exclusive => FileExt::try_lock_exclusive(&file),
        };
        match locked {
            Ok(()) => {
                trace!("Acquired {:?} lock on {}", mode, path.display());
                Ok(Self { file })
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => Err(Error::Locked(path.to_path_buf())),
            // fs2 reports contention with the platform's lock error on some targets
            Err(e) if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() => {
                Err(Error::Locked(path.to_path_buf()))
            }
            Err(e) => Err(Error::io(path)(e)),
        }
    }
}

impl Drop for RepoLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
