//! Unified application error type.
//! All modules (db, core, scan, cli, export) return AppError to keep the error
//! handling consistent and easy to manage.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    #[error("Database check failed: {0}")]
    DbCheck(String),

    // ---------------------------
    // Validation errors
    // ---------------------------
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Invalid attendance status: {0}")]
    InvalidStatus(String),

    // ---------------------------
    // Lookup errors
    // ---------------------------
    #[error("Event {0} not found")]
    EventNotFound(i64),

    #[error("Session {0} not found")]
    SessionNotFound(i64),

    #[error("Person '{0}' not found")]
    PersonNotFound(String),

    #[error("No attendance entry for '{person_id}' in session {session_id}")]
    EntryNotFound { session_id: i64, person_id: String },

    // ---------------------------
    // Capture device errors
    // ---------------------------
    #[error("Could not open capture device: {0}")]
    CameraUnavailable(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // ---------------------------
    // Import / Export errors
    // ---------------------------
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Export error: {0}")]
    Export(String),

    #[error("QR badge error: {0}")]
    Badge(String),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

impl AppError {
    /// Unknown event, session, person or entry.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::EventNotFound(_)
                | AppError::SessionNotFound(_)
                | AppError::PersonNotFound(_)
                | AppError::EntryNotFound { .. }
        )
    }

    /// Rejected before any mutation took place.
    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_) | AppError::InvalidStatus(_))
    }
}

pub type AppResult<T> = Result<T, AppError>;
