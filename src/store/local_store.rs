//! Local disk file store implementation

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::error::ApiError;
use crate::store::{validate_name, FileStore, StoredFile};

/// Disk-backed store over a flat directory of uploaded files. No
/// in-memory cache is kept; every call reflects the current on-disk
/// state.
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    /// Create a store rooted at `root`, creating the directory if absent.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, ApiError> {
        let root = root.as_ref().to_path_buf();
        if !root.exists() {
            fs::create_dir_all(&root)?;
            info!("Created store root {}", root.display());
        }
        Ok(Self { root })
    }

    fn file_path(&self, name: &str) -> Result<PathBuf, ApiError> {
        validate_name(name)?;
        Ok(self.root.join(name))
    }
}

impl FileStore for LocalFileStore {
    fn put(&self, name: &str, bytes: &[u8]) -> Result<StoredFile, ApiError> {
        let path = self.file_path(name)?;
        // The root may have been swept away out-of-band since new()
        fs::create_dir_all(&self.root)?;
        fs::write(&path, bytes)?;
        let modified = fs::metadata(&path).and_then(|m| m.modified()).ok();
        info!("Stored {} ({} bytes)", name, bytes.len());
        Ok(StoredFile {
            name: name.to_string(),
            modified,
        })
    }

    fn get(&self, name: &str) -> Result<Vec<u8>, ApiError> {
        let path = self.file_path(name)?;
        fs::read(&path).map_err(ApiError::from_io)
    }

    fn list(&self) -> Result<Vec<String>, ApiError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            if !file_type.is_file() {
                continue;
            }
            if let Ok(name) = entry.file_name().into_string() {
                if name.ends_with(".csv") {
                    names.push(name);
                }
            }
        }
        Ok(names)
    }

    fn entries(&self) -> Result<Vec<StoredFile>, ApiError> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            if !file_type.is_file() {
                continue;
            }
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(_) => continue,
            };
            // An unreadable timestamp is recorded as None, not an error
            let modified = entry.metadata().and_then(|m| m.modified()).ok();
            files.push(StoredFile { name, modified });
        }
        Ok(files)
    }

    fn remove(&self, name: &str) -> Result<(), ApiError> {
        let path = self.file_path(name)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("Removed {}", name);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Remove of absent file {} ignored", name);
                Ok(())
            }
            Err(e) => Err(ApiError::Storage(e)),
        }
    }
}
