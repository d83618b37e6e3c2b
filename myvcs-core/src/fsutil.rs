use crate::error::{Error, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tracing::warn;

/// Writes `data` to `target` through a uniquely named file in `tmp_dir`
/// followed by a rename, so readers see either the old or the new content.
///
/// `tmp_dir` must live on the same filesystem as `target`.
pub fn atomic_write(tmp_dir: &Path, target: &Path, data: &[u8], sync: bool) -> Result<()> {
    fs::create_dir_all(tmp_dir).map_err(Error::io(tmp_dir))?;
    let temp_path = tmp_dir.join(uuid::Uuid::new_v4().to_string());

    let write = || -> std::io::Result<()> {
        let mut file = File::create(&temp_path)?;
        file.write_all(data)?;
        if sync {
            file.sync_all()?;
        }
        Ok(())
    };
    if let Err(e) = write() {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::io(&temp_path)(e));
    }

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(Error::io(parent))?;
    }
    fs::rename(&temp_path, target).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        Error::io(target)(e)
    })?;

    Ok(())
}

/// Removes leftovers of interrupted atomic writes. Returns how many entries
/// were deleted.
pub fn clean_tmp_dir(tmp_dir: &Path) -> Result<usize> {
    if !tmp_dir.exists() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in fs::read_dir(tmp_dir).map_err(Error::io(tmp_dir))? {
        let path = entry.map_err(Error::io(tmp_dir))?.path();
        if path.is_dir() {
            fs::remove_dir_all(&path).map_err(Error::io(&path))?;
        } else {
            fs::remove_file(&path).map_err(Error::io(&path))?;
        }
        warn!("Removed incomplete write: {}", path.display());
        removed += 1;
    }

    Ok(removed)
}
