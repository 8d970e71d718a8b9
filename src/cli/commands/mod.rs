//! Command implementations.

pub mod completions;
pub mod export;
pub mod ingest;
pub mod reshare;
pub mod space;
pub mod status;
pub mod version;

use std::path::PathBuf;

use crate::config::resolve_db_path;
use crate::error::{Error, Result};
use crate::storage::EntityStore;

/// Open the entity store at the resolved database path.
///
/// The database is created on first use.
pub(crate) fn open_store(db_path: Option<&PathBuf>) -> Result<EntityStore> {
    let path = resolve_db_path(db_path.map(PathBuf::as_path))
        .ok_or_else(|| Error::Config("cannot determine home directory for database".into()))?;
    EntityStore::open(&path)
}
