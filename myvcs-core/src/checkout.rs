use crate::error::{Error, Result};
use crate::fsutil::atomic_write;
use crate::hash::ObjectId;
use crate::layout::Layout;
use crate::models::Commit;
use crate::object_store::ObjectStore;
use tracing::{debug, warn};

/// What happened to one file of a checked-out commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    Restored { path: String, hash: ObjectId },
    /// The blob is gone from the object store; the working file was left
    /// untouched.
    MissingObject { path: String, hash: ObjectId },
}

impl RestoreOutcome {
    pub fn path(&self) -> &str {
        match self {
            RestoreOutcome::Restored { path, .. } | RestoreOutcome::MissingObject { path, .. } => {
                path
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct CheckoutReport {
    pub commit: Commit,
    pub files: Vec<RestoreOutcome>,
}

impl CheckoutReport {
    pub fn restored(&self) -> impl Iterator<Item = &RestoreOutcome> {
        self.files
            .iter()
            .filter(|f| matches!(f, RestoreOutcome::Restored { .. }))
    }

    pub fn missing(&self) -> impl Iterator<Item = &RestoreOutcome> {
        self.files
            .iter()
            .filter(|f| matches!(f, RestoreOutcome::MissingObject { .. }))
    }

    /// True when every file of the commit was restored.
    pub fn is_complete(&self) -> bool {
        self.missing().next().is_none()
    }
}

/// Overwrites the working files of `commit` with their committed content.
///
/// Every path is validated before anything is written. A blob missing from
/// the store is recorded and skipped; any other failure aborts the restore.
pub fn restore_files(
    commit: &Commit,
    store: &ObjectStore,
    layout: &Layout,
    sync: bool,
) -> Result<Vec<RestoreOutcome>> {
    for entry in &commit.files {
        layout.check_tracked_name(&entry.path)?;
    }

    let mut outcomes = Vec::with_capacity(commit.files.len());
    for entry in &commit.files {
        let content = match store.get(&entry.hash) {
            Ok(content) => content,
            Err(Error::ObjectNotFound(hash)) => {
                warn!("Object {} for {} not found, skipping", hash, entry.path);
                outcomes.push(RestoreOutcome::MissingObject {
                    path: entry.path.clone(),
                    hash,
                });
                continue;
            }
            Err(e) => return Err(e),
        };

        let target = layout.working_file(&entry.path);
        atomic_write(&layout.tmp_dir(), &target, &content, sync)?;
        debug!("Restored {} ({})", entry.path, entry.hash.short());

        outcomes.push(RestoreOutcome::Restored {
            path: entry.path.clone(),
            hash: entry.hash.clone(),
        });
    }

    Ok(outcomes)
}
