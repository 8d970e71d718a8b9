//! Status command implementation.

use std::path::PathBuf;

use crate::cli::commands::open_store;
use crate::config::resolve_export_path;
use crate::error::{Error, Result};
use crate::sync::{get_sync_status, print_status};

/// Execute the status command.
///
/// # Errors
///
/// Returns an error if the store cannot be opened.
pub fn execute(db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let store = open_store(db_path)?;
    let outbox = resolve_export_path(None)
        .ok_or_else(|| Error::Config("cannot determine home directory for outbox".into()))?;
    let status = get_sync_status(&store, &outbox);

    if json {
        println!("{}", serde_json::to_string(&status)?);
    } else {
        print_status(&status);
    }
    Ok(())
}
