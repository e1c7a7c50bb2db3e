//! Unified application error type.
//! All modules (db, core, platform, cli) return AppError to keep the error
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
    // Storage-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    // ---------------------------
    // Serialization
    // ---------------------------
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid time format: {0}")]
    InvalidTime(String),

    #[error("Invalid punch type: {0}")]
    InvalidPunchType(String),

    // ---------------------------
    // Session / remote
    // ---------------------------
    #[error("Not signed in: run `rpunch login` first")]
    NotSignedIn,

    #[error("Employee id unknown for user '{0}'")]
    MissingEmployeeId(String),

    #[error("Remote error{}: {message}", http_suffix(.status))]
    Remote {
        status: Option<u16>,
        message: String,
    },

    // ---------------------------
    // Platform collaborators
    // ---------------------------
    #[error("Location error: {0}")]
    Location(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

fn http_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

impl AppError {
    pub fn remote(status: Option<u16>, message: impl Into<String>) -> Self {
        AppError::Remote {
            status,
            message: message.into(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
