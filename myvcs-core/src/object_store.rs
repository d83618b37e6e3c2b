//! Write-once, content-addressed blob storage.
//!
//! Every blob lives in its own file under `objects/`, named by the hex SHA-256
//! of its content. Writing content that is already present is a no-op, so the
//! store holds at most one copy of any content.

use crate::error::{Error, Result};
use crate::fsutil::atomic_write;
use crate::hash::ObjectId;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

pub struct ObjectStore {
    dir: PathBuf,
    tmp_dir: PathBuf,
    sync: bool,
}

impl ObjectStore {
    pub fn new<P: AsRef<Path>>(dir: P, tmp_dir: P, sync: bool) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            tmp_dir: tmp_dir.as_ref().to_path_buf(),
            sync,
        }
    }

    fn object_path(&self, id: &ObjectId) -> PathBuf {
        self.dir.join(id.as_str())
    }

    pub fn contains(&self, id: &ObjectId) -> bool {
        self.object_path(id).is_file()
    }

    /// Hashes and stores `content`. Returns the id and whether a new object
    /// was written.
    pub fn put(&self, content: &[u8]) -> Result<(ObjectId, bool)> {
        let id = ObjectId::for_content(content);
        let created = self.put_with_id(&id, content)?;
        Ok((id, created))
    }

    /// Stores `content` under an id the caller already computed.
    pub fn put_with_id(&self, id: &ObjectId, content: &[u8]) -> Result<bool> {
        if self.contains(id) {
            trace!("Object {} already stored", id.short());
            return Ok(false);
        }

        atomic_write(&self.tmp_dir, &self.object_path(id), content, self.sync)?;
        debug!("Stored object {} ({} bytes)", id.short(), content.len());
        Ok(true)
    }

    pub fn get(&self, id: &ObjectId) -> Result<Vec<u8>> {
        let path = self.object_path(id);
        fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::ObjectNotFound(id.clone()),
            _ => Error::io(&path)(e),
        })
    }

    /// Ids of every stored object, sorted.
    pub fn ids(&self) -> Result<Vec<ObjectId>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(Error::io(&self.dir))? {
            let entry = entry.map_err(Error::io(&self.dir))?;
            let name = entry.file_name();
            match name.to_str().map(ObjectId::parse) {
                Some(Ok(id)) => ids.push(id),
                _ => debug!("Ignoring stray entry {:?} in object store", name),
            }
        }
        ids.sort();
        Ok(ids)
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.ids()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> ObjectStore {
        let objects = dir.path().join("objects");
        fs::create_dir_all(&objects).unwrap();
        ObjectStore::new(objects, dir.path().join("tmp"), false)
    }

    #[test]
    fn test_put_and_get() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let (id, created) = store.put(b"hello").unwrap();
        assert!(created);
        assert_eq!(id, ObjectId::for_content(b"hello"));
        assert_eq!(store.get(&id).unwrap(), b"hello");
    }

    #[test]
    fn test_put_deduplicates() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let (first, _) = store.put(b"same").unwrap();
        let (second, created) = store.put(b"same").unwrap();

        assert_eq!(first, second);
        assert!(!created);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_get_missing_object() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let id = ObjectId::for_content(b"never stored");

        assert!(matches!(store.get(&id), Err(Error::ObjectNotFound(missing)) if missing == id));
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_ids_skip_stray_files() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.put(b"a").unwrap();
        store.put(b"b").unwrap();
        fs::write(dir.path().join("objects").join("README"), b"x").unwrap();

        let ids = store.ids().unwrap();
        assert_eq!(ids.len(), 2);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }
}
