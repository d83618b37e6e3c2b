use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Longest commit message accepted unless configured otherwise.
pub const DEFAULT_MAX_MESSAGE_LEN: usize = 255;

pub const DEFAULT_CONFIG: &str = r#"# myvcs repository settings

# Longest accepted commit message, in bytes.
max_message_len = 255

# fsync objects, the commit log and state files after writing them.
sync_writes = true
"#;

/// Per-repository settings read from `.myvcs/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub max_message_len: usize,
    pub sync_writes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_message_len: DEFAULT_MAX_MESSAGE_LEN,
            sync_writes: true,
        }
    }
}

impl Config {
    /// Loads the config file, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(toml::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(Error::io(path)(e)),
        }
    }

    pub fn check_message(&self, message: &str) -> Result<()> {
        if message.len() > self.max_message_len {
            return Err(Error::MessageTooLong {
                len: message.len(),
                max: self.max_message_len,
            });
        }
        Ok(())
    }
}
