//! Retention sweeper for aged uploads
//!
//! The sweeper runs synchronously at the start of every upload, download,
//! and listing request when retention is enabled. There is no background
//! timer: a store that receives no traffic never sweeps. Handlers must
//! sweep before serving so that an over-age file produces NotFound
//! instead of stale content.

use std::time::{Duration, SystemTime};

use log::{info, warn};

use crate::error::ApiError;
use crate::store::FileStore;

#[derive(Debug, Clone)]
pub struct RetentionSweeper {
    max_age: Duration,
}

impl RetentionSweeper {
    pub fn new(max_age_seconds: u64) -> Self {
        Self {
            max_age: Duration::from_secs(max_age_seconds),
        }
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Delete every file whose age exceeds the configured maximum.
    /// Returns the number of files removed. Files whose modification
    /// timestamp cannot be read are skipped; so are individual removal
    /// failures. Only a failure to enumerate the store aborts the sweep.
    pub fn sweep(&self, store: &dyn FileStore) -> Result<usize, ApiError> {
        let now = SystemTime::now();
        let mut removed = 0;

        for file in store.entries()? {
            let modified = match file.modified {
                Some(modified) => modified,
                None => {
                    warn!("Skipping {}: modification time unreadable", file.name);
                    continue;
                }
            };
            // A clock that ran backwards yields age zero, never a panic
            let age = now.duration_since(modified).unwrap_or_default();
            if age <= self.max_age {
                continue;
            }
            match store.remove(&file.name) {
                Ok(()) => {
                    info!("Swept {} (age {}s)", file.name, age.as_secs());
                    removed += 1;
                }
                Err(e) => {
                    warn!("Failed to sweep {}: {}", file.name, e);
                }
            }
        }

        Ok(removed)
    }
}
