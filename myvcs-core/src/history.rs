use crate::error::{Error, Result};
use crate::hash::ObjectId;
use crate::models::Commit;
use std::collections::BTreeMap;

/// Commits in log order, rebuilt from the commit log by each operation that
/// needs them.
#[derive(Debug, Clone, Default)]
pub struct CommitHistory {
    commits: Vec<Commit>,
}

/// Latest committed hash of every filename the log mentions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileVersionMap {
    versions: BTreeMap<String, ObjectId>,
}

impl CommitHistory {
    /// Links `records` into a history and replays their file lists into a
    /// version map in the same pass.
    pub fn rebuild(records: Vec<Commit>) -> Result<(Self, FileVersionMap)> {
        let mut commits = Vec::new();
        commits.try_reserve_exact(records.len())?;
        let mut versions = FileVersionMap::default();

        for commit in records {
            for entry in &commit.files {
                versions.record(&entry.path, entry.hash.clone());
            }
            commits.push(commit);
        }

        Ok((Self { commits }, versions))
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    /// Oldest commit first; reverse with `.rev()`.
    pub fn iter(&self) -> std::slice::Iter<'_, Commit> {
        self.commits.iter()
    }

    pub fn first(&self) -> Option<&Commit> {
        self.commits.first()
    }

    pub fn last(&self) -> Option<&Commit> {
        self.commits.last()
    }

    pub fn get(&self, id: &str) -> Option<&Commit> {
        self.position(id).map(|i| &self.commits[i])
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.commits.iter().position(|c| c.id == id)
    }

    /// The commit made just before `id`.
    pub fn previous(&self, id: &str) -> Option<&Commit> {
        let i = self.position(id)?;
        i.checked_sub(1).map(|p| &self.commits[p])
    }

    /// The commit made just after `id`.
    pub fn next(&self, id: &str) -> Option<&Commit> {
        let i = self.position(id)?;
        self.commits.get(i + 1)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.commits.iter().map(|c| c.id.as_str())
    }

    /// Finds the commit a user-supplied id fragment refers to.
    ///
    /// An exact id match wins. Otherwise the fragment must be contained in
    /// exactly one commit id; several matches are reported as
    /// [`Error::AmbiguousCommit`].
    pub fn resolve(&self, fragment: &str) -> Result<&Commit> {
        if fragment.is_empty() {
            return Err(Error::CommitNotFound(fragment.to_string()));
        }
        if let Some(commit) = self.get(fragment) {
            return Ok(commit);
        }

        let matches: Vec<&Commit> = self
            .commits
            .iter()
            .filter(|c| c.id.contains(fragment))
            .collect();

        match matches.as_slice() {
            [] => Err(Error::CommitNotFound(fragment.to_string())),
            [only] => Ok(*only),
            many => Err(Error::AmbiguousCommit {
                fragment: fragment.to_string(),
                candidates: many.iter().map(|c| c.id.clone()).collect(),
            }),
        }
    }
}

impl<'a> IntoIterator for &'a CommitHistory {
    type Item = &'a Commit;
    type IntoIter = std::slice::Iter<'a, Commit>;

    fn into_iter(self) -> Self::IntoIter {
        self.commits.iter()
    }
}

impl FileVersionMap {
    /// Records `hash` as the latest version of `path`, replacing any older one.
    pub fn record(&mut self, path: &str, hash: ObjectId) -> Option<ObjectId> {
        self.versions.insert(path.to_string(), hash)
    }

    pub fn get(&self, path: &str) -> Option<&ObjectId> {
        self.versions.get(path)
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ObjectId)> {
        self.versions.iter().map(|(path, hash)| (path.as_str(), hash))
    }
}
