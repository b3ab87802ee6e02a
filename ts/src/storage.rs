//! Durable storage backends for the serialized task list

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::error::StoreError;

/// Fixed key the task list is stored under
pub const TASKS_KEY: &str = "tasks";

/// A single durable slot holding the JSON task array
pub trait Storage: Send {
    /// Read the stored value. `Ok(None)` means nothing has been written yet.
    fn read(&self) -> Result<Option<String>, StoreError>;

    /// Overwrite the stored value unconditionally
    fn write(&self, value: &str) -> Result<(), StoreError>;
}

/// `<data-dir>/tasks.json`
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", TASKS_KEY))
    }
}

impl Storage for FileStorage {
    fn read(&self) -> Result<Option<String>, StoreError> {
        let path = self.path();
        debug!(?path, "FileStorage::read: called");
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("FileStorage::read: no file yet");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, value: &str) -> Result<(), StoreError> {
        let path = self.path();
        debug!(?path, bytes = value.len(), "FileStorage::write: called");
        fs::create_dir_all(&self.dir)?;

        // Rename over the old file so a crash mid-write never leaves half a list
        let tmp = self.dir.join(format!(".{}.json.tmp", TASKS_KEY));
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// In-process storage with switchable failures
///
/// Clones share the same slot, so a test can keep a handle while the store
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    value: Arc<Mutex<Option<String>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    writes: Arc<AtomicUsize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeded with a raw value (may be malformed on purpose)
    pub fn with_value(value: impl Into<String>) -> Self {
        let storage = Self::default();
        storage.set(value);
        storage
    }

    pub fn set(&self, value: impl Into<String>) {
        if let Ok(mut slot) = self.value.lock() {
            *slot = Some(value.into());
        }
    }

    pub fn get(&self) -> Option<String> {
        self.value.lock().ok().and_then(|slot| slot.clone())
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl Storage for MemoryStorage {
    fn read(&self) -> Result<Option<String>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("read refused".to_string()));
        }
        let slot = self
            .value
            .lock()
            .map_err(|_| StoreError::Unavailable("storage lock poisoned".to_string()))?;
        Ok(slot.clone())
    }

    fn write(&self, value: &str) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("quota exceeded".to_string()));
        }
        let mut slot = self
            .value
            .lock()
            .map_err(|_| StoreError::Unavailable("storage lock poisoned".to_string()))?;
        *slot = Some(value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_storage_absent() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path());
        assert!(storage.read().unwrap().is_none());
    }

    #[test]
    fn test_file_storage_write_read() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path().join("nested"));
        storage.write("[]").unwrap();
        storage.write("[1]").unwrap();
        assert_eq!(storage.read().unwrap().as_deref(), Some("[1]"));
        assert!(storage.path().ends_with("tasks.json"));
    }

    #[test]
    fn test_memory_storage_failures() {
        let storage = MemoryStorage::new();
        storage.fail_writes(true);
        assert!(storage.write("[]").is_err());
        assert_eq!(storage.write_count(), 0);

        storage.fail_writes(false);
        storage.write("[]").unwrap();
        assert_eq!(storage.write_count(), 1);

        storage.fail_reads(true);
        assert!(matches!(storage.read(), Err(StoreError::Unavailable(_))));
    }

    #[test]
    fn test_memory_storage_clones_share_slot() {
        let storage = MemoryStorage::new();
        let handle = storage.clone();
        storage.write("[]").unwrap();
        assert_eq!(handle.get().as_deref(), Some("[]"));
    }
}
