//! Remote Mirror Abstraction
//!
//! This module provides an abstraction over the remote storage provider
//! an upload is mirrored to. The policy is fixed: overwrite on conflict,
//! never auto-rename, never raise remote notifications. There are no
//! retries and no rollback of the local write when the mirror fails; the
//! upload handler propagates the failure to the caller instead.

pub mod dropbox;
pub mod mock_mirror;

use async_trait::async_trait;

use crate::error::ApiError;

#[async_trait]
pub trait RemoteMirror: Send + Sync {
    /// Send the bytes of a locally stored file to the remote path.
    /// `remote_path` is the stored name prefixed with `/`.
    async fn mirror(&self, bytes: &[u8], remote_path: &str) -> Result<(), ApiError>;
}

/// Remote path for a stored file name
pub fn remote_path_for(stored_name: &str) -> String {
    format!("/{}", stored_name)
}
