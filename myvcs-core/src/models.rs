use crate::hash::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A staged filename bound to the hash of its content at commit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    pub hash: ObjectId,
}

impl FileEntry {
    pub fn new(path: impl Into<String>, hash: ObjectId) -> Self {
        Self {
            path: path.into(),
            hash,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub files: Vec<FileEntry>,
}

impl Commit {
    pub fn new(id: String, message: String, files: Vec<FileEntry>) -> Self {
        Self {
            id,
            timestamp: Utc::now(),
            message,
            files,
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn file(&self, path: &str) -> Option<&FileEntry> {
        self.files.iter().find(|entry| entry.path == path)
    }
}

/// Commit id for `timestamp`: its Unix seconds, with a `-N` suffix when an
/// earlier commit already took that second.
pub fn commit_id_for<'a, I>(timestamp: DateTime<Utc>, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let base = timestamp.timestamp().to_string();
    let taken: Vec<&str> = existing.into_iter().collect();
    if !taken.contains(&base.as_str()) {
        return base;
    }

    let mut n = 1;
    loop {
        let candidate = format!("{base}-{n}");
        if !taken.contains(&candidate.as_str()) {
            return candidate;
        }
        n += 1;
    }
}
