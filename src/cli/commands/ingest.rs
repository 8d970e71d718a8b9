//! Ingest command implementation.

use std::path::{Path, PathBuf};

use colored::Colorize;
use tracing::info;

use crate::cli::commands::open_store;
use crate::error::Result;
use crate::model::{Synchronizable, User};
use crate::sharing::{update_for_users, RecomputeReport};
use crate::sync::{read_payload, Coordinator, IngestionPayload, IngestionReport};

/// Execute the ingest command.
///
/// Runs one ingestion cycle, then (unless `no_reshare`) recomputes space
/// relationships for every user, since ingested owners and categories
/// change visibility.
///
/// # Errors
///
/// Returns an error if the payload cannot be read or parsed, or if the
/// store cannot be saved.
pub fn execute(file: &Path, no_reshare: bool, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let text = read_payload(file)?;
    let payload = IngestionPayload::from_json_str(&text)?;

    let mut store = open_store(db_path)?;
    let report = Coordinator::new(&mut store).run(payload)?;

    let reshare = if no_reshare {
        None
    } else {
        let users: Vec<String> = store.all::<User>().map(|user| user.id().to_string()).collect();
        let recompute = update_for_users(&mut store, &users);
        store.save()?;
        info!(changed = recompute.changed, "space relationships refreshed");
        Some(recompute)
    };

    if json {
        let output = serde_json::json!({
            "success": true,
            "file": file.display().to_string(),
            "report": report,
            "reshare": reshare,
        });
        println!("{}", serde_json::to_string(&output)?);
    } else {
        print_report(file, &report, reshare.as_ref());
    }
    Ok(())
}

fn print_report(file: &Path, report: &IngestionReport, reshare: Option<&RecomputeReport>) {
    println!("Ingested: {}", file.display());
    println!();
    for kind in &report.kinds {
        println!(
            "  {:<20} {} created, {} updated, {} skipped",
            kind.kind.as_str(),
            kind.stats.created,
            kind.stats.updated,
            kind.stats.skipped
        );
    }
    for key in &report.unknown_kinds {
        println!("  {:<20} {}", key, "ignored (unknown kind)".dimmed());
    }

    let issues: Vec<_> = report.kinds.iter().flat_map(|kind| &kind.issues).collect();
    if !issues.is_empty() {
        println!();
        println!("{}", "Issues:".yellow().bold());
        for issue in issues {
            println!("  {issue}");
        }
    }

    println!();
    println!(
        "Saved: {} rows written, {} deleted",
        report.saved.upserted, report.saved.deleted
    );
    if let Some(reshare) = reshare {
        println!(
            "Spaces: {} of {} entities changed",
            reshare.changed, reshare.examined
        );
    }
}
