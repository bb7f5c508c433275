//! Shared application state for the web API.

use std::sync::Arc;

use crate::exif::MetadataStripper;
use crate::storage::SharedStore;
use crate::upload::UploadService;
use crate::{Config, Database};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database handle.
    pub db: Database,
    /// Object store for upload payloads.
    pub store: SharedStore,
    /// Metadata stripper for images and videos.
    pub stripper: Arc<MetadataStripper>,
    /// Loaded configuration.
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        db: Database,
        store: SharedStore,
        stripper: Arc<MetadataStripper>,
        config: Config,
    ) -> Self {
        Self {
            db,
            store,
            stripper,
            config: Arc::new(config),
        }
    }

    /// Upload service bound to this state.
    pub fn uploads(&self) -> UploadService<'_> {
        UploadService::new(
            &self.db,
            self.store.as_ref(),
            &self.stripper,
            &self.config.upload,
        )
    }

    /// Lifetime of a browser login in days.
    pub fn session_days(&self) -> i64 {
        self.config.auth.session_days
    }
}
