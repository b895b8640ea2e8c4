//! Error types for deepflow-core operations.
//!
//! Most failure paths in the core are recovered where they happen (see the
//! local store and sync coordinator). These variants cover the operations that
//! hand a failure back to the caller.

use std::path::PathBuf;

/// All errors that can occur in deepflow-core operations.
#[derive(Debug, thiserror::Error)]
pub enum FocusError {
    // ─────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Configuration file malformed: {path}: {details}")]
    ConfigMalformed { path: PathBuf, details: String },

    // ─────────────────────────────────────────────────────────────────────
    // Domain Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Invalid target duration: {minutes} minutes (expected 1-240)")]
    InvalidTarget { minutes: u32 },

    #[error("Invalid note: {reason}")]
    InvalidNote { reason: String },

    // ─────────────────────────────────────────────────────────────────────
    // Remote Store Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Remote {operation} failed: {details}")]
    Remote { operation: String, details: String },

    #[error("Remote {operation} returned {status}: {body}")]
    RemoteStatus {
        operation: String,
        status: u16,
        body: String,
    },

    // ─────────────────────────────────────────────────────────────────────
    // I/O Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FocusError {
    pub fn invalid_note(reason: impl Into<String>) -> Self {
        FocusError::InvalidNote {
            reason: reason.into(),
        }
    }

    pub fn remote(operation: impl Into<String>, details: impl Into<String>) -> Self {
        FocusError::Remote {
            operation: operation.into(),
            details: details.into(),
        }
    }

    /// True for failures that came from the remote store rather than the device.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            FocusError::Remote { .. } | FocusError::RemoteStatus { .. }
        )
    }
}

/// Convenience type alias for Results using FocusError.
pub type Result<T> = std::result::Result<T, FocusError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_errors_are_classified() {
        assert!(FocusError::remote("insert sessions", "timeout").is_remote());
        assert!(FocusError::RemoteStatus {
            operation: "select notes".to_string(),
            status: 500,
            body: String::new(),
        }
        .is_remote());
        assert!(!FocusError::invalid_note("empty").is_remote());
    }

    #[test]
    fn test_invalid_target_message_names_range() {
        let err = FocusError::InvalidTarget { minutes: 0 };
        assert_eq!(
            err.to_string(),
            "Invalid target duration: 0 minutes (expected 1-240)"
        );
    }
}
