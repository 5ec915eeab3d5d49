//! Mock implementation of FileStore for testing

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use log::info;

use crate::error::ApiError;
use crate::store::{validate_name, FileStore, StoredFile};

/// In-memory store keyed by file name. Modification timestamps can be
/// backdated or cleared to exercise the retention sweeper.
#[derive(Default)]
pub struct MockFileStore {
    files: Mutex<HashMap<String, (Vec<u8>, Option<SystemTime>)>>,
}

impl MockFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of files currently held
    pub fn file_count(&self) -> usize {
        self.files.lock().unwrap().len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.lock().unwrap().contains_key(name)
    }

    /// Insert a file whose modification time lies `age` in the past
    pub fn insert_aged(&self, name: &str, bytes: &[u8], age: Duration) {
        let modified = SystemTime::now().checked_sub(age);
        self.files
            .lock()
            .unwrap()
            .insert(name.to_string(), (bytes.to_vec(), modified));
    }

    /// Insert a file with no readable modification timestamp
    pub fn insert_without_timestamp(&self, name: &str, bytes: &[u8]) {
        self.files
            .lock()
            .unwrap()
            .insert(name.to_string(), (bytes.to_vec(), None));
    }
}

impl FileStore for MockFileStore {
    fn put(&self, name: &str, bytes: &[u8]) -> Result<StoredFile, ApiError> {
        validate_name(name)?;
        let modified = Some(SystemTime::now());
        self.files
            .lock()
            .unwrap()
            .insert(name.to_string(), (bytes.to_vec(), modified));
        info!("Mock: stored {} ({} bytes)", name, bytes.len());
        Ok(StoredFile {
            name: name.to_string(),
            modified,
        })
    }

    fn get(&self, name: &str) -> Result<Vec<u8>, ApiError> {
        self.files
            .lock()
            .unwrap()
            .get(name)
            .map(|(bytes, _)| bytes.clone())
            .ok_or(ApiError::NotFound)
    }

    fn list(&self) -> Result<Vec<String>, ApiError> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .keys()
            .filter(|name| name.ends_with(".csv"))
            .cloned()
            .collect())
    }

    fn entries(&self) -> Result<Vec<StoredFile>, ApiError> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .iter()
            .map(|(name, (_, modified))| StoredFile {
                name: name.clone(),
                modified: *modified,
            })
            .collect())
    }

    fn remove(&self, name: &str) -> Result<(), ApiError> {
        self.files.lock().unwrap().remove(name);
        Ok(())
    }
}
