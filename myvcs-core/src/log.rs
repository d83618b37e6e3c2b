//! Append-only commit log.
//!
//! The log is a text file that starts with a version header and holds one
//! record per commit:
//!
//! ```text
//! myvcs-log v1
//! commit "1700000000"
//! date 2023-11-14T22:13:20+00:00
//! message "first"
//! file 2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824 "a.txt"
//!
//! ```
//!
//! Ids, messages and filenames are JSON string literals, so no value can
//! contain a raw line break and record boundaries (the blank line) are
//! unambiguous. Records are only ever appended.

use crate::error::{Error, Result};
use crate::hash::ObjectId;
use crate::models::{Commit, FileEntry};
use chrono::{DateTime, Utc};
use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const LOG_VERSION: u32 = 1;
const HEADER_PREFIX: &str = "myvcs-log ";

pub fn header() -> String {
    format!("{HEADER_PREFIX}v{LOG_VERSION}")
}

pub struct CommitLog {
    path: PathBuf,
    sync: bool,
}

impl CommitLog {
    pub fn new<P: AsRef<Path>>(path: P, sync: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            sync,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the log in bytes; a missing log has size zero.
    pub fn len(&self) -> Result<u64> {
        match std::fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
            Err(e) => Err(Error::io(&self.path)(e)),
        }
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Parses every record, in append order.
    pub fn read(&self) -> Result<Vec<Commit>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                return Err(Error::corrupt(0, "log is not valid UTF-8"))
            }
            Err(e) => return Err(Error::io(&self.path)(e)),
        };
        parse(&text)
    }

    /// Writes the version header into an empty log.
    pub fn create(&self) -> Result<()> {
        if self.len()? > 0 {
            return Ok(());
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(Error::io(&self.path))?;
        writeln!(file, "{}", header()).map_err(Error::io(&self.path))?;
        Ok(())
    }

    /// Appends `commit` after the first `offset` bytes of the log, discarding
    /// anything beyond them. Replaying the same append after a crash yields
    /// the same file.
    pub fn append_at(&self, commit: &Commit, offset: u64) -> Result<()> {
        let mut record = String::new();
        if offset == 0 {
            record.push_str(&header());
            record.push('\n');
        }
        record.push_str(&encode_record(commit)?);

        let write = || -> std::io::Result<()> {
            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(false)
                .open(&self.path)?;
            file.set_len(offset)?;
            file.seek(SeekFrom::Start(offset))?;
            file.write_all(record.as_bytes())?;
            if self.sync {
                file.sync_all()?;
            }
            Ok(())
        };
        write().map_err(Error::io(&self.path))?;

        debug!(
            "Appended commit {} to log at offset {} ({} bytes)",
            commit.id,
            offset,
            record.len()
        );
        Ok(())
    }
}

fn quote(value: &str) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

pub fn encode_record(commit: &Commit) -> Result<String> {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "commit {}", quote(&commit.id)?);
    let _ = writeln!(out, "date {}", commit.timestamp.to_rfc3339());
    let _ = writeln!(out, "message {}", quote(&commit.message)?);
    for entry in &commit.files {
        let _ = writeln!(out, "file {} {}", entry.hash, quote(&entry.path)?);
    }
    out.push('\n');
    Ok(out)
}

struct PartialRecord {
    start: usize,
    id: String,
    timestamp: Option<DateTime<Utc>>,
    message: Option<String>,
    files: Vec<FileEntry>,
}

impl PartialRecord {
    fn field(&mut self, line_no: usize, line: &str) -> Result<()> {
        let (key, value) = line
            .split_once(' ')
            .ok_or_else(|| Error::corrupt(line_no, format!("malformed line {line:?}")))?;

        match key {
            "date" if self.timestamp.is_none() => {
                let parsed = DateTime::parse_from_rfc3339(value)
                    .map_err(|e| Error::corrupt(line_no, format!("bad date: {e}")))?;
                self.timestamp = Some(parsed.with_timezone(&Utc));
            }
            "message" if self.message.is_none() => {
                self.message = Some(unquote(line_no, value)?);
            }
            "file" => {
                let (hash, path) = value
                    .split_once(' ')
                    .ok_or_else(|| Error::corrupt(line_no, "file line needs a hash and a path"))?;
                let hash = ObjectId::parse(hash)
                    .map_err(|e| Error::corrupt(line_no, e.to_string()))?;
                self.files.try_reserve(1)?;
                self.files.push(FileEntry::new(unquote(line_no, path)?, hash));
            }
            "commit" => {
                return Err(Error::corrupt(
                    line_no,
                    format!("record starting at line {} is not terminated", self.start),
                ))
            }
            "date" | "message" => {
                return Err(Error::corrupt(line_no, format!("duplicate {key} field")))
            }
            other => return Err(Error::corrupt(line_no, format!("unknown field {other:?}"))),
        }
        Ok(())
    }

    fn finish(self) -> Result<Commit> {
        let timestamp = self
            .timestamp
            .ok_or_else(|| Error::corrupt(self.start, "record has no date"))?;
        let message = self
            .message
            .ok_or_else(|| Error::corrupt(self.start, "record has no message"))?;
        Ok(Commit {
            id: self.id,
            timestamp,
            message,
            files: self.files,
        })
    }
}

fn unquote(line_no: usize, value: &str) -> Result<String> {
    serde_json::from_str(value)
        .map_err(|e| Error::corrupt(line_no, format!("bad string literal: {e}")))
}

/// Parses the full text of a log.
pub fn parse(text: &str) -> Result<Vec<Commit>> {
    let mut lines = text.lines().enumerate().map(|(i, line)| (i + 1, line));

    match lines.next() {
        None => return Ok(Vec::new()),
        Some((_, line)) if line == header() => {}
        Some((_, line)) if line.starts_with(HEADER_PREFIX) => {
            return Err(Error::UnsupportedLogVersion(
                line[HEADER_PREFIX.len()..].to_string(),
            ))
        }
        Some((line_no, _)) => return Err(Error::corrupt(line_no, "missing log header")),
    }

    let mut commits: Vec<Commit> = Vec::new();
    let mut current: Option<PartialRecord> = None;

    for (line_no, line) in lines {
        match current.take() {
            None if line.is_empty() => {}
            None => {
                let id = line
                    .strip_prefix("commit ")
                    .ok_or_else(|| Error::corrupt(line_no, "expected a commit header"))?;
                current = Some(PartialRecord {
                    start: line_no,
                    id: unquote(line_no, id)?,
                    timestamp: None,
                    message: None,
                    files: Vec::new(),
                });
            }
            Some(record) if line.is_empty() => {
                commits.try_reserve(1)?;
                commits.push(record.finish()?);
            }
            Some(mut record) => {
                record.field(line_no, line)?;
                current = Some(record);
            }
        }
    }

    if let Some(record) = current {
        return Err(Error::corrupt(
            record.start,
            "record is missing its terminating blank line",
        ));
    }

    Ok(commits)
}
