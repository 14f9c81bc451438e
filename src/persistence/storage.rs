use super::files::{atomic_write, ensure_dir, read_file};
use anyhow::Result;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Key holding the JSON task list
pub const TASKS_KEY: &str = "tasks";
/// Key holding the hourly rate as a stringified number
pub const HOURLY_RATE_KEY: &str = "hourlyRate";

/// String key-value store the task list is persisted into
pub trait Storage {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn save(&self, key: &str, value: &str) -> Result<()>;
}

/// One `<key>.json` file per key inside a data directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        ensure_dir(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Storage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>> {
        read_file(self.path_for(key))
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        atomic_write(self.path_for(key), value)
    }
}

/// In-memory storage. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl Storage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get(key))
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_round_trip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(temp_dir.path().join("data")).unwrap();

        assert_eq!(storage.load(TASKS_KEY).unwrap(), None);
        storage.save(TASKS_KEY, "[]").unwrap();
        assert_eq!(storage.load(TASKS_KEY).unwrap().as_deref(), Some("[]"));
        assert!(storage.dir().join("tasks.json").exists());
    }

    #[test]
    fn test_file_storage_keys_are_separate() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(temp_dir.path()).unwrap();

        storage.save(TASKS_KEY, "[]").unwrap();
        storage.save(HOURLY_RATE_KEY, "42.5").unwrap();
        assert_eq!(storage.load(HOURLY_RATE_KEY).unwrap().as_deref(), Some("42.5"));
        assert_eq!(storage.load(TASKS_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_memory_storage_clones_share_entries() {
        let storage = MemoryStorage::new();
        let observer = storage.clone();

        storage.save("k", "v").unwrap();
        assert_eq!(observer.get("k").as_deref(), Some("v"));
        assert_eq!(observer.load("missing").unwrap(), None);
    }
}
