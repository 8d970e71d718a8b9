//! Payload file operations.
//!
//! Ingestion payloads are read whole; egress payloads are written
//! atomically (temp file, fsync, rename) so a crash never leaves a
//! half-written outbox behind.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::sync::types::{SyncError, SyncResult};

/// Write content to a file atomically.
///
/// If any step fails, the original file (if any) remains untouched.
///
/// # Errors
///
/// Returns an error if any file operation fails.
pub fn atomic_write(path: &Path, content: &str) -> SyncResult<()> {
    let temp_path = path.with_extension("json.tmp");

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    {
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(content.as_bytes())?;
        writer.flush()?;
        // Sync to disk before rename
        writer.get_ref().sync_all()?;
    }

    fs::rename(&temp_path, path)?;

    Ok(())
}

/// Read a payload file into a string.
///
/// # Errors
///
/// Returns [`SyncError::FileNotFound`] if the file does not exist, or an IO
/// error if it cannot be read.
pub fn read_payload(path: &Path) -> SyncResult<String> {
    if !path.exists() {
        return Err(SyncError::FileNotFound(path.display().to_string()));
    }
    Ok(fs::read_to_string(path)?)
}

/// Get the size of a file in bytes.
///
/// Returns 0 if the file doesn't exist.
pub fn file_size(path: &Path) -> u64 {
    fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}
