//! Backup codec: the portable JSON document for export/import.
//!
//! DESIGN
//! ======
//! A backup is `{ folders, svgs, exportedAt }`. Decoding is split in two:
//! `check_backup_text` is the strict pre-check a collaborator runs on a file
//! before importing (size, JSON, shape, string ids), and `decode` is the
//! looser parse the store itself performs, which only insists on the two
//! arrays and readable records.
//!
//! ERROR HANDLING
//! ==============
//! Every check here runs before the store is touched, so a rejected backup
//! never leaves the collection half-replaced.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use time::macros::format_description;

use crate::records::{Folder, Svg};

/// File name collaborators use when saving an export.
pub const BACKUP_FILE_NAME: &str = "svg-manager-backup.json";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("invalid file type, expected a .json file: {0}")]
    WrongExtension(String),
    #[error("backup too large: {size} bytes exceeds limit of {limit}")]
    TooLarge { size: usize, limit: usize },
    #[error("invalid JSON format: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("invalid data structure: {0}")]
    UnexpectedShape(String),
    #[error("backup file I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl crate::error::ErrorCode for BackupError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::WrongExtension(_) => "E_BACKUP_EXTENSION",
            Self::TooLarge { .. } => "E_BACKUP_TOO_LARGE",
            Self::InvalidJson(_) => "E_BACKUP_JSON",
            Self::UnexpectedShape(_) => "E_BACKUP_SHAPE",
            Self::Io(_) => "E_BACKUP_IO",
        }
    }
}

/// The whole collection as written to and read from a backup file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub folders: Vec<Folder>,
    pub svgs: Vec<Svg>,
    /// ISO-8601 UTC, millisecond precision. Absent in hand-written imports.
    #[serde(default)]
    pub exported_at: Option<String>,
}

impl Backup {
    /// Snapshot `folders` and `svgs`, stamped with the current time.
    #[must_use]
    pub fn new(folders: Vec<Folder>, svgs: Vec<Svg>) -> Self {
        Self { folders, svgs, exported_at: Some(iso_now()) }
    }
}

// =============================================================================
// ENCODE / DECODE
// =============================================================================

/// Serialize a backup to a JSON string.
///
/// # Errors
///
/// Returns `InvalidJson` if serialization fails.
pub fn encode(backup: &Backup) -> Result<String, BackupError> {
    Ok(serde_json::to_string(backup)?)
}

/// Parse backup JSON.
///
/// Rejects unparseable text, missing or non-array `folders`/`svgs`, and
/// records that cannot be read as folders or svgs.
///
/// # Errors
///
/// Returns `InvalidJson` or `UnexpectedShape`.
pub fn decode(text: &str) -> Result<Backup, BackupError> {
    let value: Value = serde_json::from_str(text)?;
    require_arrays(&value)?;
    serde_json::from_value(value).map_err(|e| BackupError::UnexpectedShape(e.to_string()))
}

// =============================================================================
// PRE-CHECKS
// =============================================================================

/// Reject file names that do not end in `.json`.
///
/// # Errors
///
/// Returns `WrongExtension`.
pub fn check_backup_file_name(name: &str) -> Result<(), BackupError> {
    if name.to_ascii_lowercase().ends_with(".json") {
        Ok(())
    } else {
        Err(BackupError::WrongExtension(name.to_string()))
    }
}

/// Strict pre-check run before handing backup text to the store.
///
/// Beyond what `decode` checks, every folder needs a string `id` and `name`
/// and every svg a string `id` and `code`, and the text must fit `max_bytes`.
///
/// # Errors
///
/// Returns `TooLarge`, `InvalidJson`, or `UnexpectedShape`.
pub fn check_backup_text(text: &str, max_bytes: usize) -> Result<(), BackupError> {
    if text.len() > max_bytes {
        return Err(BackupError::TooLarge { size: text.len(), limit: max_bytes });
    }

    let value: Value = serde_json::from_str(text)?;
    require_arrays(&value)?;

    let folders = value["folders"].as_array().map_or(&[][..], Vec::as_slice);
    if let Some(idx) = folders.iter().position(|f| !has_string_fields(f, &["id", "name"])) {
        return Err(BackupError::UnexpectedShape(format!("folder {idx} needs string id and name")));
    }

    let svgs = value["svgs"].as_array().map_or(&[][..], Vec::as_slice);
    if let Some(idx) = svgs.iter().position(|s| !has_string_fields(s, &["id", "code"])) {
        return Err(BackupError::UnexpectedShape(format!("svg {idx} needs string id and code")));
    }

    Ok(())
}

fn require_arrays(value: &Value) -> Result<(), BackupError> {
    for key in ["folders", "svgs"] {
        if !value.get(key).is_some_and(Value::is_array) {
            return Err(BackupError::UnexpectedShape(format!("`{key}` must be an array")));
        }
    }
    Ok(())
}

fn has_string_fields(value: &Value, fields: &[&str]) -> bool {
    fields.iter().all(|field| value.get(field).is_some_and(Value::is_string))
}

// =============================================================================
// TIME
// =============================================================================

/// Current UTC time as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
#[must_use]
pub fn iso_now() -> String {
    format_iso(OffsetDateTime::now_utc())
}

pub(crate) fn format_iso(at: OffsetDateTime) -> String {
    let format = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z");
    at.format(&format).unwrap_or_default()
}

#[cfg(test)]
#[path = "backup_test.rs"]
mod tests;
