//! Remote relational store contract.
//!
//! The remote side is a per-user scoped table store (`sessions`, `notes`).
//! Rows cross this boundary as JSON objects in the remote schema; the typed
//! mapping to and from the in-memory model lives in [`schema`].
//!
//! Implementations:
//! - [`MemoryRemoteStore`]: in-process tables with failure injection (tests, demos)
//! - `deepflow-remote`: HTTP adapter for a PostgREST endpoint

mod memory;
pub mod schema;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::identity::UserIdentity;

pub use memory::{MemoryRemoteStore, WriteCall, WriteOp};
pub use schema::{NoteRow, SessionRow};

pub const SESSIONS_TABLE: &str = "sessions";
pub const NOTES_TABLE: &str = "notes";

/// Account-scoped remote storage.
///
/// Every call is a single round trip with no retries. No timeout is enforced
/// here; adapters may add their own.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// All rows of `table` owned by `user`, ordered by `order_by` descending.
    async fn select(&self, table: &str, user: &UserIdentity, order_by: &str) -> Result<Vec<Value>>;

    /// Inserts new rows. Conflicting ids are an error.
    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<()>;

    /// Inserts or replaces rows keyed by `id`, as one bulk write.
    async fn upsert(&self, table: &str, rows: Vec<Value>) -> Result<()>;

    /// Deletes the row with `id` owned by `user`. Missing rows are not an error.
    async fn delete(&self, table: &str, user: &UserIdentity, id: &str) -> Result<()>;
}
