//! The repository: the command surface over the persisted state.
//!
//! Everything durable lives under `.myvcs/` (see [`Layout`]). Commit history
//! and the file-version map are rebuilt from the commit log by each
//! operation and never cached between operations.

use crate::checkout::{restore_files, CheckoutReport};
use crate::config::{Config, DEFAULT_CONFIG};
use crate::error::{Error, Result};
use crate::fsutil::{atomic_write, clean_tmp_dir};
use crate::hash::{hash_file, read_and_hash};
use crate::head::Head;
use crate::history::{CommitHistory, FileVersionMap};
use crate::index::StagingIndex;
use crate::journal::{Journal, PendingCommit};
use crate::layout::Layout;
use crate::lock::{LockMode, RepoLock};
use crate::log::CommitLog;
use crate::models::{commit_id_for, Commit, FileEntry};
use crate::object_store::ObjectStore;
use crate::status::{inspect, Status};
use chrono::Utc;
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    Created,
    AlreadyExists,
}

pub struct Repository {
    layout: Layout,
    config: Config,
    store: ObjectStore,
    index: StagingIndex,
    log: CommitLog,
    head: Head,
    journal: Journal,
}

impl Repository {
    /// Creates the control directory under `root`. Running it on an existing
    /// repository only fills in missing pieces; nothing is overwritten.
    pub fn init<P: AsRef<Path>>(root: P) -> Result<(Self, InitOutcome)> {
        let layout = Layout::new(root);
        let outcome = if layout.exists() {
            InitOutcome::AlreadyExists
        } else {
            InitOutcome::Created
        };

        let objects = layout.objects_dir();
        fs::create_dir_all(&objects).map_err(Error::io(&objects))?;
        {
            let _lock = RepoLock::acquire(&layout.lock_file(), LockMode::Exclusive)?;
            for path in [layout.index_file(), layout.head_file()] {
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)
                    .map_err(Error::io(&path))?;
            }
            CommitLog::new(layout.log_file(), true).create()?;

            let config_path = layout.config_file();
            if !config_path.exists() {
                atomic_write(&layout.tmp_dir(), &config_path, DEFAULT_CONFIG.as_bytes(), true)?;
            }
        }

        let control = layout.control_dir().display();
        match outcome {
            InitOutcome::Created => info!("Initialized repository in {}", control),
            InitOutcome::AlreadyExists => debug!("Repository already exists at {}", control),
        }

        Ok((Self::open(layout.root())?, outcome))
    }

    /// Opens the repository rooted at `root`, finishing any interrupted
    /// commit first.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let layout = Layout::new(root);
        if !layout.exists() {
            return Err(Error::NotARepository(layout.control_dir().to_path_buf()));
        }

        let config = Config::load(&layout.config_file())?;
        let sync = config.sync_writes;
        let tmp = layout.tmp_dir();

        let repo = Self {
            store: ObjectStore::new(layout.objects_dir(), tmp.clone(), sync),
            index: StagingIndex::new(layout.index_file(), tmp.clone(), sync),
            log: CommitLog::new(layout.log_file(), sync),
            head: Head::new(layout.head_file(), tmp.clone(), sync),
            journal: Journal::new(layout.journal_file(), tmp, sync),
            layout,
            config,
        };

        if repo.needs_recovery() {
            let _lock = repo.lock(LockMode::Exclusive)?;
            repo.recover()?;
        }

        Ok(repo)
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn objects(&self) -> &ObjectStore {
        &self.store
    }

    fn lock(&self, mode: LockMode) -> Result<RepoLock> {
        RepoLock::acquire(&self.layout.lock_file(), mode)
    }

    fn needs_recovery(&self) -> bool {
        let tmp_dirty = fs::read_dir(self.layout.tmp_dir())
            .map(|mut entries| entries.next().is_some())
            .unwrap_or(false);
        tmp_dirty || self.layout.journal_file().exists()
    }

    /// Removes partial writes and completes a journaled commit. The caller
    /// must hold the exclusive lock. Returns whether anything was repaired.
    fn recover(&self) -> Result<bool> {
        let cleaned = clean_tmp_dir(&self.layout.tmp_dir())?;
        match self.journal.read()? {
            Some(pending) => {
                warn!("Completing interrupted commit {}", pending.commit.id);
                self.apply(&pending)?;
                Ok(true)
            }
            None => Ok(cleaned > 0),
        }
    }

    /// Steps of a commit after its journal entry is durable. Every step can
    /// be repeated safely.
    fn apply(&self, pending: &PendingCommit) -> Result<()> {
        self.log.append_at(&pending.commit, pending.log_offset)?;
        self.head.write(&pending.commit.id)?;
        self.index.clear()?;
        self.journal.clear()
    }

    pub fn add(&self, name: &str) -> Result<()> {
        self.layout.check_tracked_name(name)?;
        let _lock = self.lock(LockMode::Exclusive)?;
        self.recover()?;

        let path = self.layout.working_file(name);
        let meta = fs::metadata(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::FileNotFound(name.to_string()),
            _ => Error::io(&path)(e),
        })?;
        if !meta.is_file() {
            return Err(Error::InvalidPath(format!("{name} is not a regular file")));
        }
        let hash = hash_file(&path, name)?;

        self.index.add(name)?;
        info!("Added {} ({})", name, hash.short());
        Ok(())
    }

    pub fn staged(&self) -> Result<Vec<String>> {
        let _lock = self.lock(LockMode::Shared)?;
        self.index.list()
    }

    pub fn head(&self) -> Result<Option<String>> {
        let _lock = self.lock(LockMode::Shared)?;
        self.head.read()
    }

    /// Commits every staged file.
    pub fn commit(&self, message: &str) -> Result<Commit> {
        self.config.check_message(message)?;
        let _lock = self.lock(LockMode::Exclusive)?;
        self.recover()?;

        let staged = self.index.list()?;
        if staged.is_empty() {
            return Err(Error::NothingToCommit);
        }

        let (history, mut versions) = CommitHistory::rebuild(self.log.read()?)?;
        let timestamp = Utc::now();
        let id = commit_id_for(timestamp, history.ids());

        let mut files = Vec::new();
        files.try_reserve_exact(staged.len())?;
        let mut new_objects = 0;
        for name in staged {
            let (content, hash) = read_and_hash(&self.layout.working_file(&name), &name)?;
            if self.store.put_with_id(&hash, &content)? {
                new_objects += 1;
            }
            match versions.record(&name, hash.clone()) {
                Some(previous) if previous == hash => debug!("{} unchanged since last commit", name),
                Some(_) => debug!("{} modified ({})", name, hash.short()),
                None => debug!("{} committed for the first time ({})", name, hash.short()),
            }
            files.push(FileEntry::new(name, hash));
        }

        let pending = PendingCommit {
            commit: Commit::new(id, message.to_string(), files).with_timestamp(timestamp),
            log_offset: self.log.len()?,
        };
        self.journal.write(&pending)?;
        self.apply(&pending)?;

        info!(
            "Committed {} ({} file(s), {} new object(s))",
            pending.commit.id,
            pending.commit.files.len(),
            new_objects
        );
        Ok(pending.commit)
    }

    /// Commit history and file-version map, rebuilt from the log.
    pub fn history(&self) -> Result<(CommitHistory, FileVersionMap)> {
        let _lock = self.lock(LockMode::Shared)?;
        CommitHistory::rebuild(self.log.read()?)
    }

    pub fn log(&self) -> Result<CommitHistory> {
        Ok(self.history()?.0)
    }

    pub fn status(&self) -> Result<Status> {
        let _lock = self.lock(LockMode::Shared)?;
        let staged = self.index.list()?;
        let (_, versions) = CommitHistory::rebuild(self.log.read()?)?;

        let mut status = Status {
            head: self.head.read()?,
            ..Status::default()
        };
        for name in &staged {
            status
                .staged
                .push(inspect(&self.layout, &self.store, name, versions.get(name))?);
        }
        for (name, hash) in versions.iter() {
            if staged.iter().any(|s| s == name) {
                continue;
            }
            match inspect(&self.layout, &self.store, name, Some(hash)) {
                Ok(file) if file.is_modified() => status.unstaged.push(file),
                Ok(_) => {}
                Err(e @ Error::PathIo { .. }) => warn!("Skipping {}: {}", name, e),
                Err(e) => return Err(e),
            }
        }

        Ok(status)
    }

    /// Restores the files of the commit `fragment` identifies and moves HEAD
    /// to it. Files whose objects are missing are skipped and reported.
    pub fn checkout(&self, fragment: &str) -> Result<CheckoutReport> {
        let _lock = self.lock(LockMode::Exclusive)?;
        self.recover()?;

        let (history, _) = CommitHistory::rebuild(self.log.read()?)?;
        let commit = history.resolve(fragment)?.clone();
        let files = restore_files(&commit, &self.store, &self.layout, self.config.sync_writes)?;
        self.head.write(&commit.id)?;

        let report = CheckoutReport { commit, files };
        if report.is_complete() {
            info!("Checked out {}", report.commit.id);
        } else {
            warn!(
                "Checked out {} with {} missing object(s)",
                report.commit.id,
                report.missing().count()
            );
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::LineChange;
    use crate::hash::ObjectId;
    use crate::layout::CONTROL_DIR;
    use tempfile::TempDir;

    fn repo() -> (TempDir, Repository) {
        let dir = TempDir::new().unwrap();
        let (repo, outcome) = Repository::init(dir.path()).unwrap();
        assert_eq!(outcome, InitOutcome::Created);
        (dir, repo)
    }

    fn write(dir: &TempDir, name: &str, content: &str) {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_init_creates_layout() {
        let (dir, repo) = repo();
        let control = dir.path().join(CONTROL_DIR);

        assert!(control.join("objects").is_dir());
        assert!(control.join("index").is_file());
        assert!(control.join("log").is_file());
        assert!(control.join("HEAD").is_file());
        assert!(repo.log().unwrap().is_empty());
        assert_eq!(repo.head().unwrap(), None);
    }

    #[test]
    fn test_init_is_idempotent() {
        let (dir, repo) = repo();
        write(&dir, "a.txt", "hello\n");
        repo.add("a.txt").unwrap();
        let commit = repo.commit("first").unwrap();
        write(&dir, "b.txt", "b\n");
        repo.add("b.txt").unwrap();

        let (again, outcome) = Repository::init(dir.path()).unwrap();

        assert_eq!(outcome, InitOutcome::AlreadyExists);
        assert_eq!(again.log().unwrap().len(), 1);
        assert_eq!(again.head().unwrap(), Some(commit.id));
        assert_eq!(again.staged().unwrap(), vec!["b.txt"]);
    }

    #[test]
    fn test_open_requires_repository() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Repository::open(dir.path()),
            Err(Error::NotARepository(_))
        ));
    }

    #[test]
    fn test_add_validation() {
        let (dir, repo) = repo();
        write(&dir, "a.txt", "a");
        fs::create_dir_all(dir.path().join("folder")).unwrap();

        assert!(matches!(repo.add("missing.txt"), Err(Error::FileNotFound(_))));
        assert!(matches!(repo.add("folder"), Err(Error::InvalidPath(_))));
        assert!(matches!(repo.add("../a.txt"), Err(Error::InvalidPath(_))));

        repo.add("a.txt").unwrap();
        assert!(matches!(repo.add("a.txt"), Err(Error::AlreadyStaged(_))));
        assert_eq!(repo.staged().unwrap(), vec!["a.txt"]);
    }

    #[test]
    fn test_commit_requires_staged_files() {
        let (_dir, repo) = repo();
        assert!(matches!(repo.commit("empty"), Err(Error::NothingToCommit)));
        assert!(repo.log().unwrap().is_empty());
    }

    #[test]
    fn test_commit_rejects_long_message() {
        let (dir, repo) = repo();
        write(&dir, "a.txt", "a");
        repo.add("a.txt").unwrap();

        let message = "m".repeat(repo.config().max_message_len + 1);
        assert!(matches!(repo.commit(&message), Err(Error::MessageTooLong { .. })));
        assert_eq!(repo.staged().unwrap(), vec!["a.txt"]);
    }

    #[test]
    fn test_commit_records_staged_set() {
        let (dir, repo) = repo();
        write(&dir, "a.txt", "hello");
        write(&dir, "dir/b.txt", "nested");
        repo.add("a.txt").unwrap();
        repo.add("dir/b.txt").unwrap();

        let commit = repo.commit("first").unwrap();

        assert_eq!(
            commit.files,
            vec![
                FileEntry::new("a.txt", ObjectId::for_content(b"hello")),
                FileEntry::new("dir/b.txt", ObjectId::for_content(b"nested")),
            ]
        );
        assert!(repo.staged().unwrap().is_empty());
        assert_eq!(repo.head().unwrap(), Some(commit.id.clone()));
        assert_eq!(repo.objects().len().unwrap(), 2);
        assert!(!dir.path().join(CONTROL_DIR).join("journal").exists());

        let history = repo.log().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history.last(), Some(&commit));
    }

    #[test]
    fn test_same_second_commits_get_distinct_ids() {
        let (dir, repo) = repo();
        let mut ids = Vec::new();
        for content in ["one", "two", "three"] {
            write(&dir, "a.txt", content);
            repo.add("a.txt").unwrap();
            ids.push(repo.commit(content).unwrap().id);
        }

        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 3);
        for id in &ids {
            assert_eq!(repo.log().unwrap().resolve(id).unwrap().id, *id);
        }
    }

    #[test]
    fn test_status_reports_staged_and_unstaged() {
        let (dir, repo) = repo();
        write(&dir, "a.txt", "hello\n");
        write(&dir, "b.txt", "b\n");
        repo.add("a.txt").unwrap();
        repo.add("b.txt").unwrap();
        let commit = repo.commit("first").unwrap();

        let clean = repo.status().unwrap();
        assert!(!clean.has_pending_changes());
        assert!(clean.unstaged.is_empty());
        assert_eq!(clean.head, Some(commit.id));

        write(&dir, "a.txt", "world\n");
        fs::remove_file(dir.path().join("b.txt")).unwrap();
        write(&dir, "c.txt", "new\n");
        repo.add("c.txt").unwrap();

        let status = repo.status().unwrap();
        assert_eq!(status.staged.len(), 1);
        assert!(status.staged[0].is_new());
        assert_eq!(status.staged[0].changes, None);

        assert_eq!(status.unstaged.len(), 2);
        let a = &status.unstaged[0];
        assert_eq!(a.path, "a.txt");
        assert_eq!(
            a.changes,
            Some(vec![LineChange::Changed {
                line: 1,
                old: "hello\n".to_string(),
                new: "world\n".to_string(),
            }])
        );
        assert!(status.unstaged[1].is_missing());
    }

    #[test]
    fn test_status_survives_file_replaced_by_directory() {
        let (dir, repo) = repo();
        write(&dir, "a", "hello\n");
        repo.add("a").unwrap();
        repo.commit("first").unwrap();

        fs::remove_file(dir.path().join("a")).unwrap();
        fs::create_dir(dir.path().join("a")).unwrap();

        let status = repo.status().unwrap();
        assert!(!status.has_pending_changes());
        assert_eq!(status.unstaged.len(), 1);
        assert_eq!(status.unstaged[0].path, "a");
        assert!(status.unstaged[0].is_missing());
    }

    #[test]
    fn test_status_diff_for_restaged_file() {
        let (dir, repo) = repo();
        write(&dir, "a.txt", "one\ntwo\n");
        repo.add("a.txt").unwrap();
        repo.commit("first").unwrap();

        write(&dir, "a.txt", "one\ntwo\nthree\n");
        repo.add("a.txt").unwrap();

        let status = repo.status().unwrap();
        assert!(status.has_pending_changes());
        assert!(status.unstaged.is_empty());
        assert_eq!(
            status.staged[0].changes,
            Some(vec![LineChange::Added {
                line: 3,
                content: "three\n".to_string(),
            }])
        );
    }

    #[test]
    fn test_checkout_restores_and_moves_head() {
        let (dir, repo) = repo();
        write(&dir, "a.txt", "hello");
        repo.add("a.txt").unwrap();
        let first = repo.commit("first").unwrap();

        write(&dir, "a.txt", "world");
        repo.add("a.txt").unwrap();
        let second = repo.commit("second").unwrap();
        assert_eq!(repo.head().unwrap(), Some(second.id));

        let report = repo.checkout(&first.id).unwrap();

        assert!(report.is_complete());
        assert_eq!(report.commit.id, first.id);
        assert_eq!(fs::read(dir.path().join("a.txt")).unwrap(), b"hello");
        assert_eq!(repo.head().unwrap(), Some(first.id));
    }

    #[test]
    fn test_checkout_unknown_commit() {
        let (dir, repo) = repo();
        write(&dir, "a.txt", "hello");
        repo.add("a.txt").unwrap();
        let commit = repo.commit("first").unwrap();

        assert!(matches!(repo.checkout("nope"), Err(Error::CommitNotFound(_))));
        assert_eq!(repo.head().unwrap(), Some(commit.id));
    }

    #[test]
    fn test_checkout_with_missing_object() {
        let (dir, repo) = repo();
        write(&dir, "a.txt", "lost");
        write(&dir, "b.txt", "kept");
        repo.add("a.txt").unwrap();
        repo.add("b.txt").unwrap();
        let commit = repo.commit("first").unwrap();

        let lost = ObjectId::for_content(b"lost");
        fs::remove_file(dir.path().join(CONTROL_DIR).join("objects").join(lost.as_str())).unwrap();
        write(&dir, "a.txt", "edited");
        write(&dir, "b.txt", "edited");

        let report = repo.checkout(&commit.id).unwrap();

        assert!(!report.is_complete());
        assert_eq!(report.missing().count(), 1);
        assert_eq!(fs::read(dir.path().join("a.txt")).unwrap(), b"edited");
        assert_eq!(fs::read(dir.path().join("b.txt")).unwrap(), b"kept");
        assert_eq!(repo.head().unwrap(), Some(commit.id));
    }

    #[test]
    fn test_interrupted_commit_is_completed_on_open() {
        let (dir, repo) = repo();
        write(&dir, "a.txt", "hello");
        repo.add("a.txt").unwrap();

        // Simulate a crash after the journal was written and the log append
        // was cut short.
        let hash = repo.objects().put(b"hello").unwrap().0;
        let pending = PendingCommit {
            commit: Commit::new(
                "1700000000".to_string(),
                "first".to_string(),
                vec![FileEntry::new("a.txt", hash)],
            ),
            log_offset: repo.log.len().unwrap(),
        };
        repo.journal.write(&pending).unwrap();
        OpenOptions::new()
            .append(true)
            .open(dir.path().join(CONTROL_DIR).join("log"))
            .and_then(|mut f| std::io::Write::write_all(&mut f, b"commit \"1700"))
            .unwrap();
        drop(repo);

        let repo = Repository::open(dir.path()).unwrap();

        let history = repo.log().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history.last(), Some(&pending.commit));
        assert_eq!(repo.head().unwrap(), Some("1700000000".to_string()));
        assert!(repo.staged().unwrap().is_empty());
        assert!(!dir.path().join(CONTROL_DIR).join("journal").exists());
    }

    #[test]
    fn test_mutations_fail_while_locked() {
        let (dir, repo) = repo();
        write(&dir, "a.txt", "hello");

        let held = RepoLock::acquire(&repo.layout().lock_file(), LockMode::Exclusive).unwrap();
        assert!(matches!(repo.add("a.txt"), Err(Error::Locked(_))));
        assert!(matches!(repo.status(), Err(Error::Locked(_))));
        drop(held);

        repo.add("a.txt").unwrap();
    }

    #[test]
    fn test_init_fails_while_locked() {
        let (dir, repo) = repo();
        fs::remove_file(repo.layout().config_file()).unwrap();

        let held = RepoLock::acquire(&repo.layout().lock_file(), LockMode::Exclusive).unwrap();
        assert!(matches!(Repository::init(dir.path()), Err(Error::Locked(_))));
        assert!(!repo.layout().config_file().exists());
        drop(held);

        Repository::init(dir.path()).unwrap();
        assert!(repo.layout().config_file().exists());
    }
}
