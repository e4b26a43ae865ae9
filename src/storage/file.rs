//! File-backed storage

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::debug;

use super::{Storage, StorageError};

/// Storage that keeps one `<key>.json` file per key inside a directory.
///
/// Writes go to a temporary sibling first and are renamed into place, so a crash mid-write
/// leaves the previous value intact.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Creates a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the stored values.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;

        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let staging = path.with_extension("json.tmp");

        fs::create_dir_all(&self.dir)?;
        fs::write(&staging, value)?;
        fs::rename(&staging, &path)?;

        debug!(path = %path.display(), bytes = value.len(), "stored value");

        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;

        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn round_trips_values_through_files() -> TestResult {
        let dir = tempdir()?;
        let mut storage = FileStorage::new(dir.path().join("nested"));

        storage.set("cartItems", "[]")?;

        assert_eq!(storage.get("cartItems")?.as_deref(), Some("[]"));
        assert!(dir.path().join("nested").join("cartItems.json").exists());

        Ok(())
    }

    #[test]
    fn missing_file_reads_as_none() -> TestResult {
        let dir = tempdir()?;
        let storage = FileStorage::new(dir.path());

        assert_eq!(storage.get("cartItems")?, None);

        Ok(())
    }

    #[test]
    fn remove_deletes_file_and_tolerates_absence() -> TestResult {
        let dir = tempdir()?;
        let mut storage = FileStorage::new(dir.path());

        storage.set("customerDetails", "{}")?;
        storage.remove("customerDetails")?;
        storage.remove("customerDetails")?;

        assert_eq!(storage.get("customerDetails")?, None);

        Ok(())
    }

    #[test]
    fn rejects_keys_that_escape_the_directory() {
        let storage = FileStorage::new("unused");

        assert!(matches!(
            storage.get("../secrets"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(storage.get(""), Err(StorageError::InvalidKey(_))));
    }
}
