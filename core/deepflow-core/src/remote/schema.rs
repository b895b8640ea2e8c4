//! Remote row shapes and their mapping to the in-memory model.
//!
//! ```text
//! sessions(id, user_id, date, duration, timestamp)
//! notes(id, user_id, title, content, updated_at)
//! ```
//!
//! The remote schema is snake_case and carries the owning `user_id`; the model
//! is camelCase on the wire and has no owner. Both directions are spelled out
//! here and nowhere else.

use serde::{Deserialize, Serialize};

use crate::identity::UserIdentity;
use crate::types::{Note, Session};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRow {
    pub id: String,
    pub user_id: String,
    pub date: String,
    pub duration: u64,
    pub timestamp: i64,
}

impl SessionRow {
    pub fn from_session(session: &Session, user: &UserIdentity) -> Self {
        Self {
            id: session.id.clone(),
            user_id: user.id.clone(),
            date: session.date.clone(),
            duration: session.duration,
            timestamp: session.timestamp,
        }
    }

    pub fn into_session(self) -> Session {
        Session {
            id: self.id,
            date: self.date,
            duration: self.duration,
            timestamp: self.timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRow {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub updated_at: i64,
}

impl NoteRow {
    pub fn from_note(note: &Note, user: &UserIdentity) -> Self {
        Self {
            id: note.id.clone(),
            user_id: user.id.clone(),
            title: note.title.clone(),
            content: note.content.clone(),
            updated_at: note.updated_at,
        }
    }

    pub fn into_note(self) -> Note {
        Note {
            id: self.id,
            title: self.title,
            content: self.content,
            updated_at: self.updated_at,
        }
    }
}
