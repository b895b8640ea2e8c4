//! Core types shared by the timer, the stores and the sync layer.
//!
//! Field names on the wire match the persisted local format exactly
//! (`accumulatedTime`, `updatedAt`, ...) so existing data keeps loading.

use chrono::{SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════════
// Sessions
// ═══════════════════════════════════════════════════════════════════════════════

/// A completed focus session. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    /// ISO-8601 UTC timestamp of when the session was recorded.
    pub date: String,
    /// Focus duration in whole seconds.
    pub duration: u64,
    /// Epoch milliseconds, used for recency ordering.
    pub timestamp: i64,
}

impl Session {
    /// Builds a session recorded at `now_millis` with a fresh ULID.
    pub fn new(duration: u64, now_millis: i64) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            date: iso_date(now_millis),
            duration,
            timestamp: now_millis,
        }
    }
}

fn iso_date(millis: i64) -> String {
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Timer State
// ═══════════════════════════════════════════════════════════════════════════════

/// Persisted snapshot of the timer.
///
/// `is_running == true` iff `start_time` is present. `accumulated_time` is the
/// time banked before the current running segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimerState {
    pub is_running: bool,
    pub start_time: Option<i64>,
    pub accumulated_time: u64,
}

impl TimerState {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn running(start_time: i64, accumulated_time: u64) -> Self {
        Self {
            is_running: true,
            start_time: Some(start_time),
            accumulated_time,
        }
    }

    pub fn paused(accumulated_time: u64) -> Self {
        Self {
            is_running: false,
            start_time: None,
            accumulated_time,
        }
    }

    /// Elapsed seconds at `now_millis`.
    ///
    /// Start times in the future (clock moved backwards) contribute nothing.
    pub fn elapsed_at(&self, now_millis: i64) -> u64 {
        match (self.is_running, self.start_time) {
            (true, Some(start)) => {
                let segment = (now_millis.saturating_sub(start)).max(0) / 1000;
                self.accumulated_time.saturating_add(segment as u64)
            }
            _ => self.accumulated_time,
        }
    }

    /// True when the running flag and start time agree.
    pub fn is_consistent(&self) -> bool {
        self.is_running == self.start_time.is_some()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Notes
// ═══════════════════════════════════════════════════════════════════════════════

pub const NOTE_TITLE_MAX_CHARS: usize = 100;
pub const NOTE_CONTENT_MAX_CHARS: usize = 5000;

/// A free-form note. Edited in place; deleted by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    /// Epoch milliseconds of the last edit.
    pub updated_at: i64,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Theme
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(format!("Unknown theme: {}", other)),
        }
    }
}
