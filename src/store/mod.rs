//! File Store Abstraction
//!
//! This module provides an abstraction over the upload store, allowing
//! the service to use different backends (local disk for deployments,
//! in-memory for tests) without affecting the handlers or the sweeper.

pub mod local_store;
pub mod mock_store;

use std::time::SystemTime;

use crate::error::ApiError;

/// A file held by the store: its name and the modification timestamp the
/// storage medium assigned at write time. `modified` is `None` when the
/// timestamp cannot be read; the retention sweeper must skip such files.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredFile {
    pub name: String,
    pub modified: Option<SystemTime>,
}

/// Trait defining the upload store interface
pub trait FileStore: Send + Sync {
    /// Write bytes under `name`, overwriting any existing file of the
    /// same name. Creates the store root if absent.
    fn put(&self, name: &str, bytes: &[u8]) -> Result<StoredFile, ApiError>;

    /// Full content of the named file, or `ApiError::NotFound`.
    fn get(&self, name: &str) -> Result<Vec<u8>, ApiError>;

    /// Names of every regular `.csv` file directly under the store root.
    /// Ordering is filesystem-dependent.
    fn list(&self) -> Result<Vec<String>, ApiError>;

    /// Every regular file under the store root with its modification
    /// timestamp, regardless of extension. Used by the retention sweeper.
    fn entries(&self) -> Result<Vec<StoredFile>, ApiError>;

    /// Delete the named file. Removing an already-absent file succeeds.
    fn remove(&self, name: &str) -> Result<(), ApiError>;
}

/// Reject names that could escape the store root. The store is a flat
/// directory; nested paths are never valid names.
pub(crate) fn validate_name(name: &str) -> Result<(), ApiError> {
    if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(ApiError::BadUpload(format!("invalid file name: {}", name)));
    }
    Ok(())
}
