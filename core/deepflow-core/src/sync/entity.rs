//! Per-entity wiring: where each type lives locally and remotely.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::identity::UserIdentity;
use crate::local::LocalKey;
use crate::remote::schema::{NoteRow, SessionRow};
use crate::remote::{NOTES_TABLE, SESSIONS_TABLE};
use crate::types::{Note, Session};

/// A synchronized entity type.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Remote row shape.
    type Row: Serialize + DeserializeOwned + Send;

    /// Human-readable name for logs.
    const NAME: &'static str;
    const LOCAL_KEY: LocalKey;
    const TABLE: &'static str;
    /// Remote column holding the natural recency of the entity.
    const RECENCY_COLUMN: &'static str;

    fn id(&self) -> &str;
    fn to_row(&self, user: &UserIdentity) -> Self::Row;
    fn from_row(row: Self::Row) -> Self;
}

impl Entity for Session {
    type Row = SessionRow;

    const NAME: &'static str = "session";
    const LOCAL_KEY: LocalKey = LocalKey::Sessions;
    const TABLE: &'static str = SESSIONS_TABLE;
    const RECENCY_COLUMN: &'static str = "timestamp";

    fn id(&self) -> &str {
        &self.id
    }

    fn to_row(&self, user: &UserIdentity) -> SessionRow {
        SessionRow::from_session(self, user)
    }

    fn from_row(row: SessionRow) -> Self {
        row.into_session()
    }
}

impl Entity for Note {
    type Row = NoteRow;

    const NAME: &'static str = "note";
    const LOCAL_KEY: LocalKey = LocalKey::NotesList;
    const TABLE: &'static str = NOTES_TABLE;
    const RECENCY_COLUMN: &'static str = "updated_at";

    fn id(&self) -> &str {
        &self.id
    }

    fn to_row(&self, user: &UserIdentity) -> NoteRow {
        NoteRow::from_note(self, user)
    }

    fn from_row(row: NoteRow) -> Self {
        row.into_note()
    }
}
