//! SQLite persistence backend.
//!
//! Every save runs inside one IMMEDIATE transaction: either all changed rows
//! land or none do.

use std::path::Path;
use std::time::Duration;

use rusqlite::{params, Connection};
use tracing::debug;

use crate::error::{Error, Result};
use crate::storage::backend::{Backend, PersistedRow};
use crate::storage::schema::apply_schema;

#[derive(Debug)]
pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    /// Open a database at the given path with a 5 second busy timeout.
    ///
    /// Creates the database and applies schema if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema fails.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;

        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl Backend for SqliteBackend {
    fn load(&self) -> Result<Vec<PersistedRow>> {
        let mut stmt = self
            .conn
            .prepare("SELECT kind, id, body, content_hash FROM entities ORDER BY kind, id")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut loaded = Vec::new();
        for row in rows {
            let (kind, id, body, content_hash) = row?;
            let kind = kind.parse().map_err(Error::Storage)?;
            loaded.push(PersistedRow {
                kind,
                id,
                body,
                content_hash,
            });
        }
        Ok(loaded)
    }

    fn write(
        &mut self,
        upserts: &[PersistedRow],
        deletes: &[(crate::model::EntityKind, String)],
    ) -> Result<()> {
        let tx = self
            .conn
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        let now = chrono::Utc::now().timestamp_millis();

        for row in upserts {
            tx.execute(
                "INSERT INTO entities (kind, id, body, content_hash, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(kind, id) DO UPDATE SET
                    body = excluded.body,
                    content_hash = excluded.content_hash,
                    updated_at = excluded.updated_at",
                params![row.kind.as_str(), row.id, row.body, row.content_hash, now],
            )?;
        }

        for (kind, id) in deletes {
            tx.execute(
                "DELETE FROM entities WHERE kind = ?1 AND id = ?2",
                params![kind.as_str(), id],
            )?;
        }

        tx.commit()?;
        debug!(upserts = upserts.len(), deletes = deletes.len(), "sqlite write committed");
        Ok(())
    }
}
