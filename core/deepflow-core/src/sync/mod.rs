//! Sync coordinator: picks the authoritative store per call.
//!
//! ```text
//!                      ┌──────────────┐
//!   fetch/add/   ───►  │ currentUser? │ ── none ──► LocalBackend  (local store only)
//!   save/remove        └──────────────┘
//!                             │ some(user) and a remote is configured
//!                             ▼
//!                       RemoteBackend (scoped to user, falls back to local on read failure)
//! ```
//!
//! Identity is resolved once per call and never cached. The two datasets are
//! never merged: switching identity switches which dataset is visible.
//!
//! None of the plain operations fail the caller. Remote read failures return
//! the local snapshot; write failures are logged and the next operation is the
//! implicit retry.
//!
//! The fallback snapshot is for display only. Saving a list that was read
//! from it while signed in would copy local data into the account, so
//! [`SyncCoordinator::update_notes`] refuses to do that.

mod entity;
mod local;
mod remote;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{FocusError, Result};
use crate::identity::IdentityProvider;
use crate::local::LocalStore;
use crate::remote::RemoteStore;
use crate::types::{Note, Session};

pub use entity::Entity;
pub use local::LocalBackend;
pub use remote::RemoteBackend;

/// Where a fetched list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Signed out: the local store is authoritative.
    Local,
    /// Signed in and the remote store answered.
    Remote,
    /// Signed in but the remote read failed; this is the local snapshot.
    LocalFallback,
}

impl Source {
    /// True when the list is the authoritative dataset for the current identity.
    pub fn is_authoritative(self) -> bool {
        !matches!(self, Source::LocalFallback)
    }
}

/// The common interface both backends implement for an entity type.
#[async_trait]
pub trait EntityBackend<T: Entity>: Send + Sync {
    /// Current list, newest first by the entity's recency field, with where
    /// it was read from.
    async fn fetch_with_source(&self) -> (Vec<T>, Source);

    async fn fetch(&self) -> Vec<T> {
        self.fetch_with_source().await.0
    }

    /// Adds one item and returns the refreshed list.
    async fn add(&self, item: T) -> Vec<T>;

    /// Writes the whole list as received.
    async fn save(&self, items: Vec<T>);

    /// Deletes one item by id.
    async fn remove(&self, id: &str);
}

pub struct SyncCoordinator {
    local: Arc<LocalStore>,
    remote: Option<Arc<dyn RemoteStore>>,
    identity: Arc<dyn IdentityProvider>,
}

impl SyncCoordinator {
    pub fn new(
        local: Arc<LocalStore>,
        remote: Arc<dyn RemoteStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            local,
            remote: Some(remote),
            identity,
        }
    }

    /// Coordinator without a remote store. Every call goes to the local store,
    /// signed in or not.
    pub fn local_only(local: Arc<LocalStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            local,
            remote: None,
            identity,
        }
    }

    pub fn local(&self) -> &Arc<LocalStore> {
        &self.local
    }

    async fn backend<T: Entity>(&self) -> Box<dyn EntityBackend<T> + '_> {
        let user = match &self.remote {
            Some(_) => self.identity.current_user().await,
            None => None,
        };

        match (user, &self.remote) {
            (Some(user), Some(remote)) => {
                debug!(entity = T::NAME, user = %user.id, "Using remote backend");
                let backend: RemoteBackend<'_, T> =
                    RemoteBackend::new(remote.as_ref(), &self.local, user);
                Box::new(backend)
            }
            _ => {
                debug!(entity = T::NAME, "Using local backend");
                let backend: LocalBackend<'_, T> = LocalBackend::new(&self.local);
                Box::new(backend)
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Generic Operations
    // ─────────────────────────────────────────────────────────────────────────────

    pub async fn fetch<T: Entity>(&self) -> Vec<T> {
        self.backend::<T>().await.fetch().await
    }

    pub async fn fetch_with_source<T: Entity>(&self) -> (Vec<T>, Source) {
        self.backend::<T>().await.fetch_with_source().await
    }

    pub async fn add<T: Entity>(&self, item: T) -> Vec<T> {
        self.backend::<T>().await.add(item).await
    }

    pub async fn save<T: Entity>(&self, items: Vec<T>) {
        self.backend::<T>().await.save(items).await
    }

    pub async fn remove<T: Entity>(&self, id: &str) {
        self.backend::<T>().await.remove(id).await
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Sessions
    // ─────────────────────────────────────────────────────────────────────────────

    pub async fn fetch_sessions(&self) -> Vec<Session> {
        self.fetch().await
    }

    pub async fn add_session(&self, session: Session) -> Vec<Session> {
        self.add(session).await
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Notes
    // ─────────────────────────────────────────────────────────────────────────────

    pub async fn fetch_notes(&self) -> Vec<Note> {
        self.fetch().await
    }

    /// Saves the entire note list; remotely this is one bulk upsert.
    pub async fn save_notes(&self, notes: Vec<Note>) {
        self.save(notes).await
    }

    /// Fetches the note list, applies `change` and saves the result.
    ///
    /// Fails without writing when the list could only be served from the
    /// local fallback, or when `change` fails.
    pub async fn update_notes<F>(&self, change: F) -> Result<Vec<Note>>
    where
        F: FnOnce(Vec<Note>) -> Result<Vec<Note>>,
    {
        let (notes, source) = self.fetch_with_source::<Note>().await;
        if !source.is_authoritative() {
            return Err(FocusError::remote(
                "save notes",
                "remote notes could not be read; not saving the local list to the account",
            ));
        }
        let notes = change(notes)?;
        self.save_notes(notes.clone()).await;
        Ok(notes)
    }

    pub async fn delete_note(&self, id: &str) {
        self.remove::<Note>(id).await
    }
}
