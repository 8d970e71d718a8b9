//! Sync types: reports, per-record issues and errors.
//!
//! Per-record problems (missing id, malformed fields, dangling references)
//! are collected as [`RecordIssue`] values and never abort a batch. Only a
//! failure to persist the store is a [`SyncError`] that ends a cycle.

use serde::Serialize;

use crate::model::EntityKind;
use crate::storage::SaveStats;

/// A soft, per-record problem found while ingesting a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum RecordIssue {
    /// The kind's payload value is not an array; nothing of it was applied.
    NotABatch { found: &'static str },
    /// The record has no (or an empty) `uid`; it was skipped.
    MissingId { index: usize },
    /// The field map does not match the kind's schema; it was skipped.
    Malformed {
        index: usize,
        uid: Option<String>,
        message: String,
    },
    /// A field required to create the entity is absent; it was skipped.
    MissingField { uid: String, field: &'static str },
    /// A present field holds an unusable value; the field was ignored.
    InvalidField {
        uid: String,
        field: &'static str,
        message: String,
    },
    /// A reference names an id not known locally; the old reference was kept.
    DanglingReference {
        uid: String,
        field: &'static str,
        target: String,
    },
}

impl RecordIssue {
    /// True when the whole record was skipped.
    #[must_use]
    pub const fn skips_record(&self) -> bool {
        matches!(
            self,
            Self::NotABatch { .. }
                | Self::MissingId { .. }
                | Self::Malformed { .. }
                | Self::MissingField { .. }
        )
    }
}

impl std::fmt::Display for RecordIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotABatch { found } => write!(f, "expected an array of records, found {found}"),
            Self::MissingId { index } => write!(f, "record #{index}: missing id"),
            Self::Malformed {
                index,
                uid,
                message,
            } => write!(
                f,
                "record #{index} ({}): malformed: {message}",
                uid.as_deref().unwrap_or("?")
            ),
            Self::MissingField { uid, field } => {
                write!(f, "{uid}: missing required field `{field}`")
            }
            Self::InvalidField {
                uid,
                field,
                message,
            } => write!(f, "{uid}: invalid `{field}`: {message}"),
            Self::DanglingReference { uid, field, target } => {
                write!(f, "{uid}: dangling reference `{field}` -> {target}")
            }
        }
    }
}

/// Record counts for one processor run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntityStats {
    /// Records that materialized a new entity.
    pub created: usize,
    /// Records applied to an existing entity.
    pub updated: usize,
    /// Records skipped entirely.
    pub skipped: usize,
}

impl EntityStats {
    /// Total records processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.created + self.updated + self.skipped
    }
}

/// Result of one processor run over a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessingReport {
    pub kind: EntityKind,
    pub stats: EntityStats,
    pub issues: Vec<RecordIssue>,
}

impl ProcessingReport {
    #[must_use]
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            stats: EntityStats::default(),
            issues: Vec::new(),
        }
    }

    /// Dangling references reported in this run.
    pub fn dangling(&self) -> impl Iterator<Item = &RecordIssue> {
        self.issues
            .iter()
            .filter(|issue| matches!(issue, RecordIssue::DanglingReference { .. }))
    }
}

/// Result of one ingestion cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct IngestionReport {
    /// One report per kind present in the payload, in processing order.
    pub kinds: Vec<ProcessingReport>,
    /// Payload keys that name no ingestible kind.
    pub unknown_kinds: Vec<String>,
    /// Rows written to the backend over the whole cycle.
    pub saved: SaveStats,
}

impl IngestionReport {
    #[must_use]
    pub fn report_for(&self, kind: EntityKind) -> Option<&ProcessingReport> {
        self.kinds.iter().find(|report| report.kind == kind)
    }

    #[must_use]
    pub fn total_processed(&self) -> usize {
        self.kinds.iter().map(|report| report.stats.total()).sum()
    }

    #[must_use]
    pub fn total_issues(&self) -> usize {
        self.kinds.iter().map(|report| report.issues.len()).sum()
    }
}

/// Statistics for an export operation.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ExportStats {
    pub users: usize,
    pub recipes: usize,
    pub todo_items: usize,
    pub meals: usize,
    pub shopping_list_items: usize,
}

impl ExportStats {
    /// Total number of records exported.
    #[must_use]
    pub fn total(&self) -> usize {
        self.users + self.recipes + self.todo_items + self.meals + self.shopping_list_items
    }

    /// Returns true if nothing was exported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Sync-specific errors.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The local store could not be saved; the cycle is not committed.
    #[error("Persistence failed after {kind} batch: {message}")]
    Persistence { kind: EntityKind, message: String },

    /// Payload is not a JSON object.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// No dirty records to export.
    #[error("No dirty records to export")]
    NothingToExport,

    /// Payload file not found.
    #[error("Payload file not found: {0}")]
    FileNotFound(String),
}

/// Result type for sync operations.
pub type SyncResult<T> = std::result::Result<T, SyncError>;
