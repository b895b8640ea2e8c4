use std::marker::PhantomData;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, warn};

use super::{Entity, EntityBackend, Source};
use crate::identity::UserIdentity;
use crate::local::LocalStore;
use crate::remote::RemoteStore;

/// Backend used while a user is signed in.
///
/// Reads fall back to the local snapshot on failure. The local store is never
/// written from here.
pub struct RemoteBackend<'a, T> {
    remote: &'a dyn RemoteStore,
    local: &'a LocalStore,
    user: UserIdentity,
    _entity: PhantomData<fn() -> T>,
}

impl<'a, T: Entity> RemoteBackend<'a, T> {
    pub fn new(remote: &'a dyn RemoteStore, local: &'a LocalStore, user: UserIdentity) -> Self {
        Self {
            remote,
            local,
            user,
            _entity: PhantomData,
        }
    }

    fn to_value(&self, item: &T) -> Option<Value> {
        match serde_json::to_value(item.to_row(&self.user)) {
            Ok(value) => Some(value),
            Err(err) => {
                error!(entity = T::NAME, id = item.id(), error = %err, "Failed to encode remote row");
                None
            }
        }
    }

    fn from_value(value: Value) -> Option<T> {
        match serde_json::from_value::<T::Row>(value) {
            Ok(row) => Some(T::from_row(row)),
            Err(err) => {
                warn!(entity = T::NAME, error = %err, "Skipping malformed remote row");
                None
            }
        }
    }
}

#[async_trait]
impl<'a, T: Entity> EntityBackend<T> for RemoteBackend<'a, T> {
    async fn fetch_with_source(&self) -> (Vec<T>, Source) {
        match self
            .remote
            .select(T::TABLE, &self.user, T::RECENCY_COLUMN)
            .await
        {
            Ok(rows) => (
                rows.into_iter().filter_map(Self::from_value).collect(),
                Source::Remote,
            ),
            Err(err) => {
                warn!(
                    entity = T::NAME,
                    error = %err,
                    "Remote fetch failed, falling back to local snapshot"
                );
                (self.local.read(T::LOCAL_KEY), Source::LocalFallback)
            }
        }
    }

    async fn add(&self, item: T) -> Vec<T> {
        if let Some(row) = self.to_value(&item) {
            if let Err(err) = self.remote.insert(T::TABLE, vec![row]).await {
                error!(entity = T::NAME, id = item.id(), error = %err, "Remote insert failed");
            }
        }
        self.fetch().await
    }

    async fn save(&self, items: Vec<T>) {
        let rows: Vec<Value> = items.iter().filter_map(|item| self.to_value(item)).collect();
        let count = rows.len();
        match self.remote.upsert(T::TABLE, rows).await {
            Ok(()) => debug!(entity = T::NAME, count, "Remote bulk upsert complete"),
            Err(err) => error!(entity = T::NAME, count, error = %err, "Remote bulk upsert failed"),
        }
    }

    async fn remove(&self, id: &str) {
        if let Err(err) = self.remote.delete(T::TABLE, &self.user, id).await {
            error!(entity = T::NAME, id, error = %err, "Remote delete failed");
        }
    }
}
