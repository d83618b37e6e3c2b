use crate::error::{Error, Result};
use std::path::{Component, Path, PathBuf};

/// Name of the control directory inside the working directory root.
pub const CONTROL_DIR: &str = ".myvcs";

/// Paths of everything the repository persists.
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
    control: PathBuf,
}

impl Layout {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        let control = root.join(CONTROL_DIR);
        Self { root, control }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn control_dir(&self) -> &Path {
        &self.control
    }

    pub fn objects_dir(&self) -> PathBuf {
        self.control.join("objects")
    }

    pub fn index_file(&self) -> PathBuf {
        self.control.join("index")
    }

    pub fn log_file(&self) -> PathBuf {
        self.control.join("log")
    }

    pub fn head_file(&self) -> PathBuf {
        self.control.join("HEAD")
    }

    pub fn config_file(&self) -> PathBuf {
        self.control.join("config.toml")
    }

    pub fn lock_file(&self) -> PathBuf {
        self.control.join("lock")
    }

    pub fn journal_file(&self) -> PathBuf {
        self.control.join("journal")
    }

    pub fn tmp_dir(&self) -> PathBuf {
        self.control.join("tmp")
    }

    /// Location of a tracked file in the working directory.
    pub fn working_file(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn exists(&self) -> bool {
        self.control.is_dir()
    }

    /// Checks that `name` can be tracked: a relative path inside the working
    /// directory, outside the control directory, and free of line breaks.
    pub fn check_tracked_name(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::InvalidPath("empty filename".to_string()));
        }
        if name.contains(['\n', '\r']) {
            return Err(Error::InvalidPath(format!("{name:?} contains a line break")));
        }

        let mut first = true;
        for component in Path::new(name).components() {
            match component {
                Component::CurDir => {}
                Component::Normal(part) if first && part == CONTROL_DIR => {
                    return Err(Error::InvalidPath(format!("{name} is inside {CONTROL_DIR}")));
                }
                Component::Normal(_) => first = false,
                _ => {
                    return Err(Error::InvalidPath(format!(
                        "{name} must be a relative path inside the repository"
                    )))
                }
            }
        }
        Ok(())
    }
}
