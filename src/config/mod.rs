//! Configuration management.
//!
//! Resolves where Hearth keeps its data:
//! - **Database**: `~/.hearth/data/hearth.db` unless overridden
//! - **Outbox**: `~/.hearth/outbox/payload.json`, the default egress file
//!
//! and which user local actions are attributed to.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Get the global Hearth directory location (`~/.hearth/`).
#[must_use]
pub fn global_hearth_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".hearth"))
}

/// Check if test mode is enabled.
///
/// Test mode is enabled by setting `HEARTH_TEST_DB=1` (or any non-empty
/// value other than `0` / `false`). It redirects the database to an
/// isolated location.
#[must_use]
pub fn is_test_mode() -> bool {
    std::env::var("HEARTH_TEST_DB")
        .map(|v| is_truthy(&v))
        .unwrap_or(false)
}

fn is_truthy(value: &str) -> bool {
    !value.is_empty() && value != "0" && !value.eq_ignore_ascii_case("false")
}

/// Get the test database path (`~/.hearth/test/hearth.db`).
#[must_use]
pub fn test_db_path() -> Option<PathBuf> {
    global_hearth_dir().map(|dir| dir.join("test").join("hearth.db"))
}

/// Resolve the database path.
///
/// Priority:
/// 1. If `explicit_path` is provided (`--db` or `HEARTH_DB`), use it directly
/// 2. `HEARTH_TEST_DB` environment variable → uses test database
/// 3. Global location: `~/.hearth/data/hearth.db`
#[must_use]
pub fn resolve_db_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    if is_test_mode() {
        return test_db_path();
    }

    global_hearth_dir().map(|dir| dir.join("data").join("hearth.db"))
}

/// Resolve the egress payload path.
///
/// Uses `explicit_path` if given, else `~/.hearth/outbox/payload.json`.
#[must_use]
pub fn resolve_export_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }
    global_hearth_dir().map(|dir| dir.join("outbox").join("payload.json"))
}

/// Resolve the user local actions are attributed to.
///
/// Priority:
/// 1. Explicit `--user` flag
/// 2. `HEARTH_USER` environment variable
/// 3. **Error**, no guessing
///
/// # Errors
///
/// Returns [`Error::Config`] if no user is configured.
pub fn resolve_user_id(explicit_user: Option<&str>) -> Result<String> {
    if let Some(id) = explicit_user.filter(|id| !id.trim().is_empty()) {
        return Ok(id.trim().to_string());
    }

    if let Ok(id) = std::env::var("HEARTH_USER") {
        if !id.trim().is_empty() {
            return Ok(id.trim().to_string());
        }
    }

    Err(Error::Config(
        "no acting user: pass --user or set HEARTH_USER".to_string(),
    ))
}
