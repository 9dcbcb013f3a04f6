use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use tempfile::NamedTempFile;

use super::storage::SlotStorage;

/// Keeps every slot in its own `<key>.json` file under one directory.
pub struct FileStorage {
    pub dir: PathBuf,
}

impl SlotStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading {:?}", path)),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let path = self.slot_path(key)?;
        fs::create_dir_all(&self.dir).with_context(|| format!("creating {:?}", self.dir))?;
        // write next to the target so the rename stays on one filesystem
        let mut tempfile = NamedTempFile::new_in(&self.dir)?;
        tempfile.write_all(value.as_bytes())?;
        tempfile
            .persist(&path)
            .with_context(|| format!("writing {:?}", path))?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let path = self.slot_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("removing {:?}", path)),
        }
    }
}

impl FileStorage {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn slot_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.contains("..") {
            bail!("Invalid slot key: {:?}", key);
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}
