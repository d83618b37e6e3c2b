use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::io::ErrorKind;
use std::path::Path;

/// Length of the hex form of an object id.
pub const OBJECT_ID_LEN: usize = 64;

/// SHA-256 content hash, stored as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId(String);

impl ObjectId {
    pub fn for_content(content: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content);
        ObjectId(hex::encode(hasher.finalize()))
    }

    pub fn parse(s: &str) -> Result<Self> {
        let valid = s.len() == OBJECT_ID_LEN
            && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if !valid {
            return Err(Error::InvalidObjectId(s.to_string()));
        }
        Ok(ObjectId(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight hex characters, for log lines.
    pub fn short(&self) -> &str {
        &self.0[..8]
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ObjectId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        ObjectId::parse(&s)
    }
}

impl From<ObjectId> for String {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

/// Reads a file and returns its content together with the content hash.
///
/// A missing file maps to [`Error::FileNotFound`] carrying `name`; any other
/// read failure is reported as an I/O error on `path`.
pub fn read_and_hash(path: &Path, name: &str) -> Result<(Vec<u8>, ObjectId)> {
    let content = std::fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => Error::FileNotFound(name.to_string()),
        _ => Error::io(path)(e),
    })?;
    let id = ObjectId::for_content(&content);
    Ok((content, id))
}

pub fn hash_file(path: &Path, name: &str) -> Result<ObjectId> {
    read_and_hash(path, name).map(|(_, id)| id)
}
