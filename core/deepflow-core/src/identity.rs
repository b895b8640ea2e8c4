//! Identity resolution capability.
//!
//! The core only needs to know whether a user is signed in, and if so under
//! which opaque id. The authentication handshake lives elsewhere and no
//! credentials pass through here.

use async_trait::async_trait;
use tokio::sync::watch;

/// Opaque identity of an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserIdentity {
    pub id: String,
}

impl UserIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Resolves the current user, fresh on every call.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_user(&self) -> Option<UserIdentity>;

    /// Change notifications for the application shell (not used by the core).
    fn subscribe(&self) -> watch::Receiver<Option<UserIdentity>>;
}

/// Provider that never has a user. Local-only mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoIdentity;

#[async_trait]
impl IdentityProvider for NoIdentity {
    async fn current_user(&self) -> Option<UserIdentity> {
        None
    }

    fn subscribe(&self) -> watch::Receiver<Option<UserIdentity>> {
        let (_tx, rx) = watch::channel(None);
        rx
    }
}

/// In-process provider driven by sign-in / sign-out calls from the shell.
pub struct SharedIdentity {
    tx: watch::Sender<Option<UserIdentity>>,
}

impl SharedIdentity {
    pub fn new(initial: Option<UserIdentity>) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn sign_in(&self, user: UserIdentity) {
        self.tx.send_replace(Some(user));
    }

    pub fn sign_out(&self) {
        self.tx.send_replace(None);
    }
}

impl Default for SharedIdentity {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl IdentityProvider for SharedIdentity {
    async fn current_user(&self) -> Option<UserIdentity> {
        self.tx.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<UserIdentity>> {
        self.tx.subscribe()
    }
}
