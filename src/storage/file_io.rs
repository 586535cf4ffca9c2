//! File I/O utilities with atomic writes
//!
//! Backup files are written to a temporary sibling and renamed into place, so
//! an interrupted run never leaves a truncated record behind.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::ConnectBackupError;

/// Write bytes to a file atomically (write to temp, then rename)
pub fn write_atomic<P: AsRef<Path>>(path: P, data: &[u8]) -> Result<(), ConnectBackupError> {
    let path = path.as_ref();

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            ConnectBackupError::Write(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    // Create temp file in same directory (important for atomic rename)
    let temp_path = path.with_extension("json.tmp");

    let file = File::create(&temp_path).map_err(|e| {
        ConnectBackupError::Write(format!(
            "Failed to create temp file {}: {}",
            temp_path.display(),
            e
        ))
    })?;

    let mut writer = BufWriter::new(file);
    writer
        .write_all(data)
        .map_err(|e| ConnectBackupError::Write(format!("Failed to write data: {}", e)))?;

    writer
        .flush()
        .map_err(|e| ConnectBackupError::Write(format!("Failed to flush data: {}", e)))?;

    // Sync to disk before rename
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| ConnectBackupError::Write(format!("Failed to sync data: {}", e)))?;

    // Atomic rename
    fs::rename(&temp_path, path).map_err(|e| {
        // Try to clean up temp file if rename fails
        let _ = fs::remove_file(&temp_path);
        ConnectBackupError::Write(format!("Failed to rename temp file: {}", e))
    })?;

    Ok(())
}

/// Read a whole file, reporting a missing file as a read error
pub fn read_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, ConnectBackupError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConnectBackupError::Read(format!(
            "File not found: {}",
            path.display()
        )));
    }

    fs::read(path)
        .map_err(|e| ConnectBackupError::Read(format!("Failed to read {}: {}", path.display(), e)))
}
