//! Persistence backends for the entity store.
//!
//! The store keeps the whole graph in memory and hands a backend only the
//! rows that changed since the last save. Backends never interpret bodies.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::model::EntityKind;

/// One serialized entity as stored at rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedRow {
    pub kind: EntityKind,
    pub id: String,
    /// JSON document of the full entity.
    pub body: String,
    /// SHA-256 of `body`.
    pub content_hash: String,
}

/// Durable storage for persisted rows.
pub trait Backend: std::fmt::Debug {
    /// Read every stored row.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be read.
    fn load(&self) -> Result<Vec<PersistedRow>>;

    /// Atomically apply upserts and deletes.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails; nothing must be applied then.
    fn write(&mut self, upserts: &[PersistedRow], deletes: &[(EntityKind, String)]) -> Result<()>;
}

/// Volatile backend for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    rows: BTreeMap<(EntityKind, String), PersistedRow>,
    fail_writes: bool,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose every write fails, for exercising abort paths.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            rows: BTreeMap::new(),
            fail_writes: true,
        }
    }

    /// Number of rows currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Backend for MemoryBackend {
    fn load(&self) -> Result<Vec<PersistedRow>> {
        Ok(self.rows.values().cloned().collect())
    }

    fn write(&mut self, upserts: &[PersistedRow], deletes: &[(EntityKind, String)]) -> Result<()> {
        if self.fail_writes {
            return Err(Error::Storage("memory backend rejected write".to_string()));
        }
        for row in upserts {
            self.rows.insert((row.kind, row.id.clone()), row.clone());
        }
        for key in deletes {
            self.rows.remove(key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str) -> PersistedRow {
        PersistedRow {
            kind: EntityKind::User,
            id: id.to_string(),
            body: "{}".to_string(),
            content_hash: "h".to_string(),
        }
    }

    #[test]
    fn test_memory_backend_write_and_load() {
        let mut backend = MemoryBackend::new();
        backend.write(&[row("u1"), row("u2")], &[]).unwrap();
        assert_eq!(backend.len(), 2);

        backend
            .write(&[], &[(EntityKind::User, "u1".to_string())])
            .unwrap();
        let rows = backend.load().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "u2");
    }

    #[test]
    fn test_failing_backend_rejects_writes() {
        let mut backend = MemoryBackend::failing();
        assert!(backend.write(&[row("u1")], &[]).is_err());
        assert!(backend.is_empty());
    }
}
