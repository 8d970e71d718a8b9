//! Error types for Hearth.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=storage, 3=not_found, 4=validation, etc.)
//! - Retryability flags
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers
//!
//! Problems with individual ingested records are not errors; they are
//! reported as [`crate::sync::RecordIssue`] values.

use thiserror::Error;

use crate::sync::SyncError;

/// Result type alias for Hearth operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
///
/// Each code maps to a SCREAMING_SNAKE string and a category-based
/// exit code. Scripts match on the string or on the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Storage (exit 2)
    DatabaseError,
    StorageError,

    // Not Found (exit 3)
    UserNotFound,
    SpaceNotFound,
    CategoryNotFound,
    FileNotFound,

    // Validation (exit 4)
    InvalidArgument,
    InvalidPayload,

    // Sync (exit 6)
    SyncError,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::DatabaseError => "DATABASE_ERROR",
            Self::StorageError => "STORAGE_ERROR",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::SpaceNotFound => "SPACE_NOT_FOUND",
            Self::CategoryNotFound => "CATEGORY_NOT_FOUND",
            Self::FileNotFound => "FILE_NOT_FOUND",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::InvalidPayload => "INVALID_PAYLOAD",
            Self::SyncError => "SYNC_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code (1-8).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::DatabaseError | Self::StorageError => 2,
            Self::UserNotFound
            | Self::SpaceNotFound
            | Self::CategoryNotFound
            | Self::FileNotFound => 3,
            Self::InvalidArgument | Self::InvalidPayload => 4,
            Self::SyncError => 6,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether the same command may succeed when retried.
    ///
    /// True for corrected input and for sync/storage failures, since an
    /// ingestion cycle can be re-driven with the same payload.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument
                | Self::InvalidPayload
                | Self::DatabaseError
                | Self::StorageError
                | Self::SyncError
        )
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in Hearth operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("User not found: {id}")]
    UserNotFound { id: String },

    #[error("Space not found: {id}")]
    SpaceNotFound { id: String },

    #[error("Category not found: {name}")]
    CategoryNotFound { name: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::UserNotFound { .. } => ErrorCode::UserNotFound,
            Self::SpaceNotFound { .. } => ErrorCode::SpaceNotFound,
            Self::CategoryNotFound { .. } => ErrorCode::CategoryNotFound,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::Storage(_) => ErrorCode::StorageError,
            Self::Sync(SyncError::InvalidPayload(_)) => ErrorCode::InvalidPayload,
            Self::Sync(SyncError::FileNotFound(_)) => ErrorCode::FileNotFound,
            Self::Sync(_) => ErrorCode::SyncError,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::UserNotFound { id } => Some(format!(
                "No user with ID '{id}'. Users arrive through `hearth ingest`."
            )),
            Self::SpaceNotFound { id } => Some(format!(
                "No space with ID '{id}'. Use `hearth space list` to see available spaces."
            )),
            Self::CategoryNotFound { name } => Some(format!(
                "No todo category named '{name}'. Categories are created when a todo item uses them."
            )),
            Self::Sync(SyncError::InvalidPayload(_)) => Some(
                "The payload must be a JSON object mapping users, recipes, todoItems, meals \
                 and shoppingListItems to arrays of records"
                    .to_string(),
            ),
            Self::Sync(SyncError::Persistence { .. }) => Some(
                "Kinds saved before the failure are kept. Re-run the same ingestion to converge."
                    .to_string(),
            ),
            Self::InvalidArgument(msg) if msg.contains("is empty") => {
                Some("Names must contain at least one non-whitespace character".to_string())
            }
            Self::InvalidArgument(_)
            | Self::Sync(_)
            | Self::Database(_)
            | Self::Storage(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Config(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    ///
    /// Includes error code, message, retryability, exit code, and
    /// optional recovery hint.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}
