//! Application State Management
//!
//! This module provides the application state that contains all
//! components and their dependencies, following the dependency injection
//! pattern: everything is constructed once from the configuration at
//! process start and handed to the handlers by reference. No component
//! reads the environment after startup.

use std::sync::Arc;

use log::info;

use crate::auth::AccessGuard;
use crate::config::{AppConfig, StoreBackend};
use crate::error::ApiError;
use crate::mirror::dropbox::DropboxMirror;
use crate::mirror::RemoteMirror;
use crate::retention::RetentionSweeper;
use crate::store::local_store::LocalFileStore;
use crate::store::mock_store::MockFileStore;
use crate::store::FileStore;

/// Application state containing all components and their dependencies
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn FileStore>,
    pub sweeper: Option<RetentionSweeper>,
    pub guard: Option<AccessGuard>,
    pub mirror: Option<Arc<dyn RemoteMirror>>,
    pub config: AppConfig,
}

impl AppState {
    /// Create application state from configuration
    pub fn from_config(config: AppConfig) -> Result<Self, ApiError> {
        let store: Arc<dyn FileStore> = match config.store.backend {
            StoreBackend::Local => {
                info!("Using local file store rooted at {}", config.store.root);
                Arc::new(LocalFileStore::new(&config.store.root)?)
            }
            StoreBackend::Mock => {
                info!("Using mock file store");
                Arc::new(MockFileStore::new())
            }
        };

        let sweeper = if config.retention.enabled {
            info!(
                "Retention sweeping enabled, max age {}s",
                config.retention.max_age_seconds
            );
            Some(RetentionSweeper::new(config.retention.max_age_seconds))
        } else {
            None
        };

        let guard = if config.auth.enabled {
            info!("Access guard enabled");
            Some(AccessGuard::new(config.access_token.clone()))
        } else {
            None
        };

        let mirror: Option<Arc<dyn RemoteMirror>> = if config.mirror.enabled {
            info!("Remote mirroring enabled via {}", config.mirror.upload_url);
            Some(Arc::new(DropboxMirror::new(
                &config.mirror,
                config.mirror_token.clone(),
            )))
        } else {
            None
        };

        Ok(Self {
            store,
            sweeper,
            guard,
            mirror,
            config,
        })
    }

    /// State with mock backends and every optional feature off
    pub fn for_testing() -> Self {
        let mut config = AppConfig::default();
        config.store.backend = StoreBackend::Mock;
        config.retention.enabled = false;
        Self {
            store: Arc::new(MockFileStore::new()),
            sweeper: None,
            guard: None,
            mirror: None,
            config,
        }
    }

    /// State with a shared mock store so tests can inspect it afterwards
    pub fn with_mock_store(store: Arc<MockFileStore>) -> Self {
        let mut state = Self::for_testing();
        state.store = store;
        state
    }

    /// Attach a mirror (tests use `MockMirror`)
    pub fn with_mirror(mut self, mirror: Arc<dyn RemoteMirror>) -> Self {
        self.mirror = Some(mirror);
        self
    }
}
