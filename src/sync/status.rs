//! Store status display.

use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use crate::storage::{EntityStore, KindStatus};
use crate::sync::file::file_size;

/// Snapshot of the store and the outbox file.
#[derive(Debug, Clone, Serialize)]
pub struct SyncStatus {
    pub kinds: Vec<KindStatus>,
    pub total_dirty: usize,
    pub outbox_path: String,
    /// Size of the outbox file in bytes, if it exists.
    pub outbox_size: Option<u64>,
}

/// Gather per-kind totals and the state of the outbox file.
#[must_use]
pub fn get_sync_status(store: &EntityStore, outbox: &Path) -> SyncStatus {
    let kinds = store.status();
    let total_dirty = kinds.iter().filter_map(|kind| kind.dirty).sum();
    SyncStatus {
        kinds,
        total_dirty,
        outbox_path: outbox.display().to_string(),
        outbox_size: outbox.exists().then(|| file_size(outbox)),
    }
}

/// Print sync status to stdout in a human-readable format.
pub fn print_status(status: &SyncStatus) {
    println!("{}", "Sync Status".bold().underline());
    println!();

    println!("{}", "Entities:".blue().bold());
    for kind in &status.kinds {
        match kind.dirty {
            Some(dirty) if dirty > 0 => println!(
                "  {:<20} {:>6}  {}",
                kind.kind.as_str(),
                kind.total,
                format!("{dirty} dirty").yellow()
            ),
            _ => println!("  {:<20} {:>6}", kind.kind.as_str(), kind.total),
        }
    }
    println!();

    if status.total_dirty > 0 {
        println!(
            "{} {}",
            "Pending Export:".yellow().bold(),
            status.total_dirty
        );
        println!("{}", "Run 'hearth export' to write the outbox.".dimmed());
    } else {
        println!("{}", "No pending changes to export.".green());
    }
    println!();

    match status.outbox_size {
        Some(size) => println!(
            "{} {} ({})",
            "Outbox:".blue().bold(),
            status.outbox_path,
            format_size(size)
        ),
        None => println!("{}", "No outbox file found.".dimmed()),
    }
}

/// Format a byte size as a human-readable string.
#[allow(clippy::cast_precision_loss)]
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}
