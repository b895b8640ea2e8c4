use std::marker::PhantomData;

use async_trait::async_trait;
use tracing::warn;

use super::{Entity, EntityBackend, Source};
use crate::local::LocalStore;

/// Backend used when nobody is signed in: the local store is the only truth.
pub struct LocalBackend<'a, T> {
    store: &'a LocalStore,
    _entity: PhantomData<fn() -> T>,
}

impl<'a, T: Entity> LocalBackend<'a, T> {
    pub fn new(store: &'a LocalStore) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    fn persist(&self, items: &[T]) {
        if let Err(err) = self.store.write(T::LOCAL_KEY, items) {
            warn!(entity = T::NAME, error = %err, "Failed to persist local list");
        }
    }
}

#[async_trait]
impl<'a, T: Entity> EntityBackend<T> for LocalBackend<'a, T> {
    async fn fetch_with_source(&self) -> (Vec<T>, Source) {
        (self.store.read(T::LOCAL_KEY), Source::Local)
    }

    async fn add(&self, item: T) -> Vec<T> {
        let mut items: Vec<T> = self.store.read(T::LOCAL_KEY);
        items.insert(0, item);
        self.persist(&items);
        items
    }

    async fn save(&self, items: Vec<T>) {
        self.persist(&items);
    }

    async fn remove(&self, id: &str) {
        let mut items: Vec<T> = self.store.read(T::LOCAL_KEY);
        let before = items.len();
        items.retain(|item| item.id() != id);
        if items.len() != before {
            self.persist(&items);
        }
    }
}
