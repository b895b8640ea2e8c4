//! Note editing helpers.
//!
//! The sync layer always receives the whole list, so editing is expressed as
//! list transforms: build or edit a note, then `upsert` it into the current
//! list inside `SyncCoordinator::update_notes`.

use crate::error::{FocusError, Result};
use crate::types::{Note, NOTE_CONTENT_MAX_CHARS, NOTE_TITLE_MAX_CHARS};

pub const UNTITLED_NOTE: &str = "Untitled Note";

fn validate(title: &str, content: &str) -> Result<()> {
    if title.is_empty() && content.trim().is_empty() {
        return Err(FocusError::invalid_note("title and content are both empty"));
    }
    let title_chars = title.chars().count();
    if title_chars > NOTE_TITLE_MAX_CHARS {
        return Err(FocusError::invalid_note(format!(
            "title is {} characters (max {})",
            title_chars, NOTE_TITLE_MAX_CHARS
        )));
    }
    let content_chars = content.chars().count();
    if content_chars > NOTE_CONTENT_MAX_CHARS {
        return Err(FocusError::invalid_note(format!(
            "content is {} characters (max {})",
            content_chars, NOTE_CONTENT_MAX_CHARS
        )));
    }
    Ok(())
}

impl Note {
    /// Creates a note. A blank title becomes "Untitled Note" as long as there
    /// is some content.
    pub fn new(title: &str, content: &str, now_millis: i64) -> Result<Self> {
        let title = title.trim();
        validate(title, content)?;
        Ok(Self {
            id: ulid::Ulid::new().to_string(),
            title: title_or_untitled(title),
            content: content.to_string(),
            updated_at: now_millis,
        })
    }

    /// Replaces title and content in place and bumps `updated_at`.
    ///
    /// The title is kept as typed; only creation fills in a default.
    pub fn edit(&mut self, title: &str, content: &str, now_millis: i64) -> Result<()> {
        let title = title.trim();
        validate(title, content)?;
        self.title = title.to_string();
        self.content = content.to_string();
        self.updated_at = now_millis;
        Ok(())
    }
}

fn title_or_untitled(title: &str) -> String {
    if title.is_empty() {
        UNTITLED_NOTE.to_string()
    } else {
        title.to_string()
    }
}

/// Replaces the note with the same id in place, or prepends it if new.
pub fn upsert(mut notes: Vec<Note>, note: Note) -> Vec<Note> {
    match notes.iter().position(|n| n.id == note.id) {
        Some(index) => notes[index] = note,
        None => notes.insert(0, note),
    }
    notes
}

/// Finds a note by id or by a unique id prefix.
pub fn find<'a>(notes: &'a [Note], id_or_prefix: &str) -> Option<&'a Note> {
    if let Some(exact) = notes.iter().find(|n| n.id == id_or_prefix) {
        return Some(exact);
    }
    let mut matches = notes.iter().filter(|n| n.id.starts_with(id_or_prefix));
    match (matches.next(), matches.next()) {
        (Some(only), None) if !id_or_prefix.is_empty() => Some(only),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(id: &str, updated_at: i64) -> Note {
        Note {
            id: id.to_string(),
            title: id.to_uppercase(),
            content: String::new(),
            updated_at,
        }
    }

    #[test]
    fn test_new_defaults_blank_title() {
        let note = Note::new("   ", "some thoughts", 10).unwrap();
        assert_eq!(note.title, UNTITLED_NOTE);
        assert_eq!(note.updated_at, 10);
    }

    #[test]
    fn test_new_rejects_empty_note() {
        assert!(Note::new("", "  \n", 10).is_err());
    }

    #[test]
    fn test_new_enforces_limits() {
        let long_title = "x".repeat(NOTE_TITLE_MAX_CHARS + 1);
        assert!(Note::new(&long_title, "", 0).is_err());

        let long_content = "y".repeat(NOTE_CONTENT_MAX_CHARS + 1);
        assert!(Note::new("t", &long_content, 0).is_err());

        let max_title = "é".repeat(NOTE_TITLE_MAX_CHARS);
        assert!(Note::new(&max_title, "", 0).is_ok());
    }

    #[test]
    fn test_edit_bumps_updated_at() {
        let mut note = Note::new("Draft", "v1", 10).unwrap();
        note.edit("Draft", "v2", 20).unwrap();
        assert_eq!(note.content, "v2");
        assert_eq!(note.updated_at, 20);
    }

    #[test]
    fn test_edit_keeps_blank_title() {
        let mut note = Note::new("Draft", "v1", 10).unwrap();
        note.edit("  ", "v1", 20).unwrap();
        assert_eq!(note.title, "");
        assert_eq!(note.content, "v1");
    }

    #[test]
    fn test_edit_rejects_emptying_note() {
        let mut note = Note::new("Draft", "v1", 10).unwrap();
        assert!(note.edit("", " ", 20).is_err());
        assert_eq!(note.title, "Draft");
        assert_eq!(note.updated_at, 10);
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let list = vec![note("a", 1), note("b", 2)];
        let mut edited = note("b", 3);
        edited.title = "changed".to_string();
        let list = upsert(list, edited);
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].title, "changed");
    }

    #[test]
    fn test_upsert_prepends_new() {
        let list = upsert(vec![note("a", 1)], note("c", 5));
        assert_eq!(list[0].id, "c");
    }

    #[test]
    fn test_find_by_prefix_requires_unique_match() {
        let list = vec![note("01HABC", 1), note("01HABD", 2)];
        assert_eq!(find(&list, "01HABC").map(|n| n.updated_at), Some(1));
        assert_eq!(find(&list, "01HABD").map(|n| n.updated_at), Some(2));
        assert!(find(&list, "01HAB").is_none());
        assert!(find(&list, "").is_none());
    }
}
