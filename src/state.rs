//! Application state management

use std::sync::Arc;

use crate::config::Config;
use crate::session::Workspaces;
use crate::storage::DocumentStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    workspaces: Workspaces,
    store: DocumentStore,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let workspaces = Workspaces::new(&config);
        let store = DocumentStore::new(workspaces.clone(), config.storage.max_upload_bytes);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                workspaces,
                store,
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn workspaces(&self) -> &Workspaces {
        &self.inner.workspaces
    }

    pub fn store(&self) -> &DocumentStore {
        &self.inner.store
    }
}
