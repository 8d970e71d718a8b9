//! Reshare command implementation.

use std::path::PathBuf;

use crate::cli::commands::open_store;
use crate::config::resolve_user_id;
use crate::error::{Error, Result};
use crate::model::{Synchronizable, User};
use crate::sharing::{update_all_space_relationships, update_for_users};

/// Execute the reshare command.
///
/// # Errors
///
/// Returns an error if no user can be resolved, the user is unknown, or the
/// store cannot be saved.
pub fn execute(
    user: Option<&str>,
    all: bool,
    acting_user: Option<&str>,
    db_path: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let mut store = open_store(db_path)?;

    let (scope, report) = if all {
        let users: Vec<String> = store.all::<User>().map(|user| user.id().to_string()).collect();
        ("all".to_string(), update_for_users(&mut store, &users))
    } else {
        let user_id = resolve_user_id(user.or(acting_user))?;
        if !store.contains::<User>(&user_id) {
            return Err(Error::UserNotFound { id: user_id });
        }
        let report = update_all_space_relationships(&mut store, &user_id);
        (user_id, report)
    };
    let saved = store.save()?;

    if json {
        let output = serde_json::json!({
            "success": true,
            "scope": scope,
            "report": report,
            "saved": saved,
        });
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!(
            "Recomputed {} entities for {scope}: {} changed, {} events updated",
            report.examined, report.changed, report.events_changed
        );
    }
    Ok(())
}
