use crate::diff::{diff, LineChange};
use crate::error::{Error, Result};
use crate::hash::{read_and_hash, ObjectId};
use crate::layout::Layout;
use crate::object_store::ObjectStore;
use tracing::warn;

/// State of one file relative to its last committed version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStatus {
    pub path: String,
    /// Hash of the working file, `None` when it no longer exists or is not a
    /// regular file.
    pub current: Option<ObjectId>,
    pub last_committed: Option<ObjectId>,
    /// Line changes from the committed version to the working file, when
    /// both are available.
    pub changes: Option<Vec<LineChange>>,
}

impl FileStatus {
    pub fn is_new(&self) -> bool {
        self.last_committed.is_none()
    }

    pub fn is_missing(&self) -> bool {
        self.current.is_none()
    }

    pub fn is_modified(&self) -> bool {
        self.current != self.last_committed
    }
}

#[derive(Debug, Clone, Default)]
pub struct Status {
    pub head: Option<String>,
    /// Files queued for the next commit, in staging order.
    pub staged: Vec<FileStatus>,
    /// Committed files whose working copy differs and that are not staged.
    pub unstaged: Vec<FileStatus>,
}

impl Status {
    /// True when something is staged for the next commit.
    pub fn has_pending_changes(&self) -> bool {
        !self.staged.is_empty()
    }
}

/// Compares the working copy of `path` against `last_committed`.
pub(crate) fn inspect(
    layout: &Layout,
    store: &ObjectStore,
    path: &str,
    last_committed: Option<&ObjectId>,
) -> Result<FileStatus> {
    let file = layout.working_file(path);
    let working = if file.exists() && !file.is_file() {
        warn!("{} is no longer a regular file", path);
        None
    } else {
        match read_and_hash(&file, path) {
            Ok(found) => Some(found),
            Err(Error::FileNotFound(_)) => None,
            Err(e) => return Err(e),
        }
    };

    let changes = match (&working, last_committed) {
        (Some((_, current)), Some(last)) if current == last => Some(Vec::new()),
        (Some((content, _)), Some(last)) => match store.get(last) {
            Ok(old) => Some(diff(&old, content)),
            Err(Error::ObjectNotFound(id)) => {
                warn!("Committed object {} for {} is missing", id, path);
                None
            }
            Err(e) => return Err(e),
        },
        _ => None,
    };

    Ok(FileStatus {
        path: path.to_string(),
        current: working.map(|(_, id)| id),
        last_committed: last_committed.cloned(),
        changes,
    })
}
