//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the configuration, the temp store receiving uploads, and the
//! map of live pages. Each page owns its components and its id sequence,
//! so the registry lock is only taken to find or evict a page.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::Config;
use crate::services::intake::TempStore;
use crate::services::page::Page;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: TempStore,
    pub pages: Arc<RwLock<HashMap<Uuid, Arc<Page>>>>,
}

impl AppState {
    #[must_use]
    pub fn new(config: Config) -> Self {
        let store = TempStore::new(config.upload_dir.clone()).with_max_bytes(config.upload_max_bytes);
        Self { config: Arc::new(config), store, pages: Arc::new(RwLock::new(HashMap::new())) }
    }
}


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
