//! Mock implementation of RemoteMirror for testing

use std::sync::Mutex;

use async_trait::async_trait;
use log::info;

use crate::error::ApiError;
use crate::mirror::RemoteMirror;

/// Records mirrored uploads in memory. Can be set to fail every call to
/// exercise the mirror-failure path.
#[derive(Default)]
pub struct MockMirror {
    uploads: Mutex<Vec<(String, Vec<u8>)>>,
    fail: bool,
}

impl MockMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mirror that rejects every upload the way the remote API would
    pub fn failing() -> Self {
        Self {
            uploads: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    /// Remote paths mirrored so far, in call order
    pub fn mirrored_paths(&self) -> Vec<String> {
        self.uploads
            .lock()
            .unwrap()
            .iter()
            .map(|(path, _)| path.clone())
            .collect()
    }

    pub fn bytes_for(&self, remote_path: &str) -> Option<Vec<u8>> {
        self.uploads
            .lock()
            .unwrap()
            .iter()
            .find(|(path, _)| path == remote_path)
            .map(|(_, bytes)| bytes.clone())
    }
}

#[async_trait]
impl RemoteMirror for MockMirror {
    async fn mirror(&self, bytes: &[u8], remote_path: &str) -> Result<(), ApiError> {
        if self.fail {
            return Err(ApiError::Mirror {
                status: 507,
                body: "{\"error_summary\": \"insufficient_space/..\"}".to_string(),
            });
        }
        self.uploads
            .lock()
            .unwrap()
            .push((remote_path.to_string(), bytes.to_vec()));
        info!("Mock: mirrored {} bytes to {}", bytes.len(), remote_path);
        Ok(())
    }
}
