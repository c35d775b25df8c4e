//! Key-value persistence port for the session store, with an in-memory
//! implementation for tests and embedding and a file-backed one for the CLI.

use std::{
    collections::HashMap,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
    #[error("storage I/O failed for key {key:?}: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error("storage lock poisoned")]
    Poisoned,
}

/// Durable storage for serialized session state.
pub trait SessionStorage: Send + Sync {
    /// Returns the stored value, or `None` when nothing is stored under `key`.
    ///
    /// # Errors
    /// Returns an error if the medium cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Returns an error if the medium cannot be written.
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing a missing key succeeds.
    ///
    /// # Errors
    /// Returns an error if the medium cannot be modified.
    fn clear(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: SessionStorage + ?Sized> SessionStorage for Arc<T> {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }

    fn clear(&self, key: &str) -> Result<(), StorageError> {
        (**self).clear(key)
    }
}

/// Process-local storage. Contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

/// Stores each key as `<dir>/<key>.json`. Writes land in a temporary file that
/// is renamed into place, so readers never observe a half-written value, and
/// a failed write leaves no temporary file behind.
#[derive(Clone, Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if valid {
            Ok(self.dir.join(format!("{key}.json")))
        } else {
            Err(StorageError::InvalidKey(key.to_string()))
        }
    }
}

fn io_error(key: &str) -> impl FnOnce(io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        key: key.to_string(),
        source,
    }
}

impl SessionStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error(key)(err)),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(io_error(key))?;

        // Dropping the temp file on any error below removes it from disk.
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(io_error(key))?;
        restrict_to_owner(tmp.as_file()).map_err(io_error(key))?;
        tmp.write_all(value.as_bytes()).map_err(io_error(key))?;
        tmp.as_file().sync_all().map_err(io_error(key))?;
        tmp.persist(&path)
            .map(drop)
            .map_err(|err| io_error(key)(err.error))
    }

    fn clear(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(key)(err)),
        }
    }
}

// Session files hold bearer tokens; keep them owner-only.
#[cfg(unix)]
fn restrict_to_owner(file: &fs::File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    file.set_permissions(fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_to_owner(_file: &fs::File) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_read_write_clear() {
        let storage = MemoryStorage::new();
        assert!(storage.read("session").expect("read").is_none());

        storage.write("session", "{}").expect("write");
        assert_eq!(storage.read("session").expect("read").as_deref(), Some("{}"));

        storage.clear("session").expect("clear");
        storage.clear("session").expect("clear twice");
        assert!(storage.read("session").expect("read").is_none());
    }

    #[test]
    fn file_storage_read_write_clear() {
        let root = tempfile::tempdir().expect("tempdir");
        let dir = root.path().join("state").join("nested");
        let storage = FileStorage::new(&dir);

        assert!(storage.read("session").expect("read missing").is_none());
        storage.clear("session").expect("clear missing key");
        assert!(!dir.exists());

        storage.write("session", r#"{"token":"a"}"#).expect("write");
        assert!(dir.is_dir());
        storage.write("session", r#"{"token":"b"}"#).expect("overwrite");
        assert_eq!(
            storage.read("session").expect("read").as_deref(),
            Some(r#"{"token":"b"}"#)
        );

        let files: Vec<_> = fs::read_dir(&dir)
            .expect("list")
            .map(|entry| entry.expect("entry").file_name())
            .collect();
        assert_eq!(files, vec![std::ffi::OsString::from("session.json")]);

        storage.clear("session").expect("clear");
        storage.clear("session").expect("clear twice");
        assert!(storage.read("session").expect("read cleared").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn file_storage_writes_owner_only_files() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FileStorage::new(dir.path());
        storage.write("session", "{}").expect("write");

        let mode = fs::metadata(dir.path().join("session.json"))
            .expect("metadata")
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn failed_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        // A directory in place of the target makes the final rename fail.
        fs::create_dir(dir.path().join("session.json")).expect("blocker");
        let storage = FileStorage::new(dir.path());

        assert!(matches!(
            storage.write("session", "{}"),
            Err(StorageError::Io { .. })
        ));
        let leftovers = fs::read_dir(dir.path()).expect("list").count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn file_storage_rejects_path_like_keys() {
        let storage = FileStorage::new("/tmp/unused");
        for key in ["", "../escape", "a/b", ".hidden"] {
            assert!(matches!(
                storage.read(key),
                Err(StorageError::InvalidKey(_))
            ));
        }
    }
}
