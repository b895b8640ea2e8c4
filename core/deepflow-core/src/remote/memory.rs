//! In-process remote store.
//!
//! Behaves like the relational backend closely enough for the sync layer:
//! rows are scoped by `user_id`, ordered on select, keyed by `id` for upsert
//! and delete. Reads and writes can be made to fail independently, and every
//! call is counted so tests can assert what reached the "network".

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::RemoteStore;
use crate::error::{FocusError, Result};
use crate::identity::UserIdentity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    Insert,
    Upsert,
    Delete,
}

/// One write call as it reached the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteCall {
    pub op: WriteOp,
    pub table: String,
    pub rows: usize,
}

#[derive(Default)]
pub struct MemoryRemoteStore {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    writes: Mutex<Vec<WriteCall>>,
    calls: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Total number of calls of any kind, including failed ones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Successful write calls, in order.
    pub fn writes(&self) -> Vec<WriteCall> {
        self.writes.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// Raw rows of a table, unscoped and in storage order.
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    fn begin(&self, operation: &str, table: &str, fail: &AtomicBool) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if fail.load(Ordering::SeqCst) {
            return Err(FocusError::remote(
                format!("{} {}", operation, table),
                "injected failure",
            ));
        }
        Ok(())
    }

    fn record(&self, op: WriteOp, table: &str, rows: usize) {
        self.writes
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(WriteCall {
                op,
                table: table.to_string(),
                rows,
            });
    }
}

fn row_id(row: &Value) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

fn row_owner(row: &Value) -> Option<&str> {
    row.get("user_id").and_then(Value::as_str)
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn select(&self, table: &str, user: &UserIdentity, order_by: &str) -> Result<Vec<Value>> {
        self.begin("select", table, &self.fail_reads)?;

        let tables = self.tables.lock().unwrap_or_else(|p| p.into_inner());
        let mut rows: Vec<Value> = tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| row_owner(row) == Some(user.id.as_str()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        rows.sort_by_key(|row| std::cmp::Reverse(row.get(order_by).and_then(Value::as_i64)));
        Ok(rows)
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<()> {
        self.begin("insert", table, &self.fail_writes)?;

        let mut tables = self.tables.lock().unwrap_or_else(|p| p.into_inner());
        let existing = tables.entry(table.to_string()).or_default();
        for row in &rows {
            if let Some(id) = row_id(row) {
                if existing.iter().any(|r| row_id(r) == Some(id)) {
                    return Err(FocusError::RemoteStatus {
                        operation: format!("insert {}", table),
                        status: 409,
                        body: format!("duplicate key value: {}", id),
                    });
                }
            }
        }
        let count = rows.len();
        existing.extend(rows);
        drop(tables);

        self.record(WriteOp::Insert, table, count);
        Ok(())
    }

    async fn upsert(&self, table: &str, rows: Vec<Value>) -> Result<()> {
        self.begin("upsert", table, &self.fail_writes)?;

        let mut tables = self.tables.lock().unwrap_or_else(|p| p.into_inner());
        let existing = tables.entry(table.to_string()).or_default();
        let count = rows.len();
        for row in rows {
            let slot = row_id(&row).and_then(|id| existing.iter().position(|r| row_id(r) == Some(id)));
            match slot {
                Some(index) => existing[index] = row,
                None => existing.push(row),
            }
        }
        drop(tables);

        self.record(WriteOp::Upsert, table, count);
        Ok(())
    }

    async fn delete(&self, table: &str, user: &UserIdentity, id: &str) -> Result<()> {
        self.begin("delete", table, &self.fail_writes)?;

        let mut tables = self.tables.lock().unwrap_or_else(|p| p.into_inner());
        let mut removed = 0;
        if let Some(rows) = tables.get_mut(table) {
            let before = rows.len();
            rows.retain(|row| !(row_id(row) == Some(id) && row_owner(row) == Some(user.id.as_str())));
            removed = before - rows.len();
        }
        drop(tables);

        self.record(WriteOp::Delete, table, removed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user(id: &str) -> UserIdentity {
        UserIdentity::new(id)
    }

    #[tokio::test]
    async fn test_select_scopes_and_orders() {
        let store = MemoryRemoteStore::new();
        store
            .insert(
                "sessions",
                vec![
                    json!({"id": "a", "user_id": "u1", "timestamp": 1}),
                    json!({"id": "b", "user_id": "u2", "timestamp": 2}),
                    json!({"id": "c", "user_id": "u1", "timestamp": 3}),
                ],
            )
            .await
            .unwrap();

        let rows = store.select("sessions", &user("u1"), "timestamp").await.unwrap();
        let ids: Vec<_> = rows.iter().filter_map(row_id).collect();
        assert_eq!(ids, vec!["c", "a"]);
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_ids() {
        let store = MemoryRemoteStore::new();
        let row = json!({"id": "a", "user_id": "u1"});
        store.insert("sessions", vec![row.clone()]).await.unwrap();
        let err = store.insert("sessions", vec![row]).await.unwrap_err();
        assert!(err.is_remote());
        assert_eq!(store.rows("sessions").len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_id() {
        let store = MemoryRemoteStore::new();
        store
            .upsert("notes", vec![json!({"id": "a", "user_id": "u1", "title": "old"})])
            .await
            .unwrap();
        store
            .upsert(
                "notes",
                vec![
                    json!({"id": "a", "user_id": "u1", "title": "new"}),
                    json!({"id": "b", "user_id": "u1", "title": "other"}),
                ],
            )
            .await
            .unwrap();

        let rows = store.rows("notes");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["title"], "new");
        assert_eq!(
            store.writes().last(),
            Some(&WriteCall {
                op: WriteOp::Upsert,
                table: "notes".to_string(),
                rows: 2
            })
        );
    }

    #[tokio::test]
    async fn test_delete_only_touches_owner_rows() {
        let store = MemoryRemoteStore::new();
        store
            .insert(
                "notes",
                vec![
                    json!({"id": "a", "user_id": "u1"}),
                    json!({"id": "b", "user_id": "u2"}),
                ],
            )
            .await
            .unwrap();

        store.delete("notes", &user("u1"), "b").await.unwrap();
        assert_eq!(store.rows("notes").len(), 2);

        store.delete("notes", &user("u1"), "a").await.unwrap();
        assert_eq!(store.rows("notes").len(), 1);
    }

    #[tokio::test]
    async fn test_injected_failures_are_counted() {
        let store = MemoryRemoteStore::new();
        store.set_fail_reads(true);
        assert!(store.select("notes", &user("u1"), "updated_at").await.is_err());

        store.set_fail_writes(true);
        assert!(store.upsert("notes", vec![]).await.is_err());

        assert_eq!(store.calls(), 2);
        assert!(store.writes().is_empty());
    }
}
