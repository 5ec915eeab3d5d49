//! Dropbox content-upload mirror implementation

use async_trait::async_trait;
use log::{error, info};
use reqwest::header::CONTENT_TYPE;
use serde_json::json;

use crate::config::MirrorConfig;
use crate::error::ApiError;
use crate::mirror::RemoteMirror;

/// Mirrors file bytes to the Dropbox `files/upload` endpoint. The upload
/// argument rides in the `Dropbox-API-Arg` header; the body is the raw
/// bytes.
pub struct DropboxMirror {
    client: reqwest::Client,
    upload_url: String,
    token: Option<String>,
}

impl DropboxMirror {
    pub fn new(config: &MirrorConfig, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            upload_url: config.upload_url.clone(),
            token,
        }
    }

    /// Fixed upload policy: overwrite on conflict, no auto-rename, no
    /// remote notifications.
    fn api_arg(remote_path: &str) -> String {
        json!({
            "path": remote_path,
            "mode": "overwrite",
            "autorename": false,
            "mute": false,
        })
        .to_string()
    }
}

#[async_trait]
impl RemoteMirror for DropboxMirror {
    async fn mirror(&self, bytes: &[u8], remote_path: &str) -> Result<(), ApiError> {
        let token = self
            .token
            .as_deref()
            .ok_or(ApiError::MissingCredential("DROPBOX_ACCESS_TOKEN"))?;

        let response = self
            .client
            .post(&self.upload_url)
            .bearer_auth(token)
            .header("Dropbox-API-Arg", Self::api_arg(remote_path))
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(bytes.to_vec())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Mirror of {} failed with {}: {}", remote_path, status, body);
            return Err(ApiError::Mirror {
                status: status.as_u16(),
                body,
            });
        }

        info!("Mirrored {} bytes to {}", bytes.len(), remote_path);
        Ok(())
    }
}
