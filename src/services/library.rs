//! Library service: the workflows collaborators run on top of the store.
//!
//! DESIGN
//! ======
//! The store is deliberately dumb: it accepts any name and any markup. The
//! acceptance rules a user-facing shell applies live here instead, so every
//! shell gets them the same way: svg text is gated by `is_valid_svg`, folder
//! renames are trimmed and skipped when nothing changed, new folders get a
//! numbered default name, and backup files pass the strict pre-check before
//! the store replaces anything.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::StoreConfig;
use crate::error::ErrorCode;
use crate::records::{Folder, NewSvg, Svg};
use crate::services::backup::{self, BACKUP_FILE_NAME, BackupError};
use crate::services::store::{StoreError, SvgStore};
use crate::svg::is_valid_svg;

pub const SVG_MEDIA_TYPE: &str = "image/svg+xml";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("not a valid SVG")]
    InvalidSvg,
    #[error("no SVG files detected")]
    NoSvgFiles,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Backup(#[from] BackupError),
}

impl ErrorCode for IntakeError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidSvg => "E_INVALID_SVG",
            Self::NoSvgFiles => "E_NO_SVG_FILES",
            Self::Store(e) => e.error_code(),
            Self::Backup(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Store(e) => e.retryable(),
            _ => false,
        }
    }
}

/// A dropped or picked file, already read into memory.
#[derive(Debug, Clone)]
pub struct SvgFile {
    pub name: String,
    /// Media type reported by the source, when it reported one.
    pub media_type: Option<String>,
    pub text: String,
}

impl SvgFile {
    /// Whether this file is offered as an svg at all, before looking at its content.
    #[must_use]
    pub fn looks_like_svg(&self) -> bool {
        match self.media_type.as_deref() {
            Some(media_type) if !media_type.is_empty() => media_type.eq_ignore_ascii_case(SVG_MEDIA_TYPE),
            _ => Path::new(&self.name)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("svg")),
        }
    }
}

/// Outcome of a multi-file intake.
#[derive(Debug, Default)]
pub struct IntakeReport {
    pub added: Vec<Svg>,
    /// Names of svg files whose content failed the validator.
    pub rejected: Vec<String>,
}

// =============================================================================
// LIBRARY
// =============================================================================

/// An [`SvgStore`] plus the limits its collaborators enforce.
#[derive(Clone, Debug)]
pub struct Library {
    store: SvgStore,
    max_import_bytes: usize,
}

impl Library {
    #[must_use]
    pub fn new(store: SvgStore, config: &StoreConfig) -> Self {
        Self { store, max_import_bytes: config.max_import_bytes }
    }

    /// Open a store from `config` and wrap it.
    ///
    /// # Errors
    ///
    /// Returns a store error if opening fails.
    pub async fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        Ok(Self::new(SvgStore::open(config).await?, config))
    }

    #[must_use]
    pub fn store(&self) -> &SvgStore {
        &self.store
    }

    // =========================================================================
    // FOLDERS
    // =========================================================================

    /// Create a folder named `New Folder {n}`, numbered after the existing ones.
    ///
    /// # Errors
    ///
    /// Returns a store error if listing or inserting fails.
    pub async fn create_folder(&self) -> Result<Folder, StoreError> {
        let count = self.store.get_folders().await?.len();
        self.store.add_folder(&default_folder_name(count)).await
    }

    /// Rename from an edit field. Returns `false` without writing when the
    /// trimmed name is empty or unchanged.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the folder disappeared.
    pub async fn rename_folder(&self, id: &str, current: &str, proposed: &str) -> Result<bool, StoreError> {
        let trimmed = proposed.trim();
        if trimmed.is_empty() || trimmed == current {
            return Ok(false);
        }
        self.store.update_folder_name(id, trimmed).await?;
        Ok(true)
    }

    // =========================================================================
    // SVG INTAKE
    // =========================================================================

    /// Store pasted text if it passes the svg gate.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSvg` if the text is not svg markup.
    pub async fn paste_svg(&self, text: &str, folder_id: Option<&str>) -> Result<Svg, IntakeError> {
        if !is_valid_svg(text) {
            warn!(bytes = text.len(), "pasted text is not a valid svg");
            return Err(IntakeError::InvalidSvg);
        }
        let new_svg = NewSvg { code: text.to_string(), folder_id: folder_id.map(str::to_string) };
        Ok(self.store.add_svg(new_svg).await?)
    }

    /// Store every valid svg among `files`.
    ///
    /// Non-svg files are ignored. Svg files with invalid content are skipped
    /// and named in the report.
    ///
    /// # Errors
    ///
    /// Returns `NoSvgFiles` if none of the files is an svg, or a store error
    /// if an insert fails (files stored before it stay stored).
    pub async fn add_svg_files(&self, files: Vec<SvgFile>, folder_id: Option<&str>) -> Result<IntakeReport, IntakeError> {
        let svg_files: Vec<SvgFile> = files.into_iter().filter(SvgFile::looks_like_svg).collect();
        if svg_files.is_empty() {
            return Err(IntakeError::NoSvgFiles);
        }

        let mut report = IntakeReport::default();
        for file in svg_files {
            if !is_valid_svg(&file.text) {
                warn!(file = %file.name, "file is not a valid svg");
                report.rejected.push(file.name);
                continue;
            }
            let new_svg = NewSvg { code: file.text, folder_id: folder_id.map(str::to_string) };
            report.added.push(self.store.add_svg(new_svg).await?);
        }

        info!(added = report.added.len(), rejected = report.rejected.len(), "svg files processed");
        Ok(report)
    }

    // =========================================================================
    // BACKUP FILES
    // =========================================================================

    /// Write an export to `dir/svg-manager-backup.json` and return its path.
    ///
    /// # Errors
    ///
    /// Returns a store error if exporting fails, or `Backup(Io)` if writing fails.
    pub async fn export_backup_file(&self, dir: &Path) -> Result<PathBuf, IntakeError> {
        let json = self.store.export_data().await?;
        let path = dir.join(BACKUP_FILE_NAME);
        tokio::fs::write(&path, json).await.map_err(BackupError::from)?;
        info!(path = %path.display(), "backup written");
        Ok(path)
    }

    /// Replace the collection with a backup file after the strict pre-check.
    ///
    /// # Errors
    ///
    /// Returns a backup error if the file name, size, or content is rejected,
    /// with the store untouched; otherwise whatever the import returns.
    pub async fn import_backup_file(&self, path: &Path) -> Result<(), IntakeError> {
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        backup::check_backup_file_name(&name)?;

        let text = tokio::fs::read_to_string(path).await.map_err(BackupError::from)?;
        if let Err(e) = backup::check_backup_text(&text, self.max_import_bytes) {
            warn!(path = %path.display(), error = %e, "backup file rejected");
            return Err(e.into());
        }

        self.store.import_data(&text).await?;
        info!(path = %path.display(), "backup imported");
        Ok(())
    }
}

/// Default name for the folder created after `existing` folders.
#[must_use]
pub fn default_folder_name(existing: usize) -> String {
    format!("New Folder {}", existing + 1)
}

#[cfg(test)]
#[path = "library_test.rs"]
mod tests;
