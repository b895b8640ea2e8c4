//! Wiring: storage, config, local store and the sync coordinator.

use std::sync::Arc;

use deepflow_core::{FocusConfig, LocalStore, StorageConfig, SyncCoordinator, SystemClock, Tracker};
use deepflow_remote::PostgrestStore;
use tracing::{info, warn};

use crate::identity::EnvIdentity;

pub struct App {
    pub storage: StorageConfig,
    pub config: FocusConfig,
    pub store: Arc<LocalStore>,
}

impl App {
    pub fn open(storage: StorageConfig) -> Self {
        let config = FocusConfig::load(&storage).with_env_overrides();
        let store = Arc::new(LocalStore::open(storage.clone()));
        Self {
            storage,
            config,
            store,
        }
    }

    /// Remote-capable when the endpoint is configured and usable.
    pub fn coordinator(&self) -> SyncCoordinator {
        let identity = Arc::new(EnvIdentity);
        let Some((url, api_key)) = self.config.remote_endpoint() else {
            return SyncCoordinator::local_only(self.store.clone(), identity);
        };

        match PostgrestStore::new(url, api_key) {
            Ok(remote) => {
                info!(url, "Cloud sync configured");
                let remote = remote.with_access_token(EnvIdentity::access_token());
                SyncCoordinator::new(self.store.clone(), Arc::new(remote), identity)
            }
            Err(err) => {
                warn!(error = %err, "Remote store unavailable, running local-only");
                SyncCoordinator::local_only(self.store.clone(), identity)
            }
        }
    }

    pub async fn tracker(&self) -> Tracker {
        Tracker::new(
            self.coordinator(),
            Arc::new(SystemClock),
            self.config.target(),
        )
        .await
    }
}
