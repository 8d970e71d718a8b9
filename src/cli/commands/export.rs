//! Export command implementation.

use std::path::PathBuf;

use crate::cli::commands::open_store;
use crate::config::resolve_export_path;
use crate::error::{Error, Result};
use crate::sync::{Exporter, SyncError};

/// Execute the export command.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or the file written.
pub fn execute(output: Option<&PathBuf>, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let output = resolve_export_path(output.map(PathBuf::as_path))
        .ok_or_else(|| Error::Config("cannot determine home directory for outbox".into()))?;
    let store = open_store(db_path)?;
    let exporter = Exporter::new(&store, output.clone());

    match exporter.export() {
        Ok(stats) => {
            if json {
                let output = serde_json::json!({
                    "success": true,
                    "output": output.display().to_string(),
                    "stats": stats,
                });
                println!("{}", serde_json::to_string(&output)?);
            } else {
                println!("Export complete");
                println!();
                if stats.users > 0 {
                    println!("  Users:               {}", stats.users);
                }
                if stats.recipes > 0 {
                    println!("  Recipes:             {}", stats.recipes);
                }
                if stats.todo_items > 0 {
                    println!("  Todo Items:          {}", stats.todo_items);
                }
                if stats.meals > 0 {
                    println!("  Meals:               {}", stats.meals);
                }
                if stats.shopping_list_items > 0 {
                    println!("  Shopping List Items: {}", stats.shopping_list_items);
                }
                println!();
                println!("  Total: {} records", stats.total());
                println!("  Location: {}", output.display());
            }
            Ok(())
        }
        Err(SyncError::NothingToExport) => {
            if json {
                let output = serde_json::json!({
                    "error": "nothing_to_export",
                    "message": "No dirty records to export."
                });
                println!("{output}");
            } else {
                println!("No dirty records to export.");
            }
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
