//! Local persistence for a personal svg icon collection.
//!
//! ARCHITECTURE
//! ============
//! - `services::store`: folder/svg CRUD, cascade delete, export/import.
//! - `services::backup`: the JSON backup document and its pre-checks.
//! - `services::library`: paste, file intake, rename, and backup-file workflows.
//! - `svg`: the structural svg gate and render-time style isolation.
//!
//! A shell opens one [`SvgStore`] (or [`Library`]) at startup, clones it
//! wherever it is needed, and re-queries after every mutation.

pub mod config;
pub mod db;
pub mod error;
pub mod records;
pub mod services;
pub mod svg;

pub use config::StoreConfig;
pub use error::ErrorCode;
pub use records::{Folder, NewSvg, Svg};
pub use services::backup::{BACKUP_FILE_NAME, Backup, BackupError};
pub use services::library::{IntakeError, IntakeReport, Library, SvgFile};
pub use services::store::{StoreError, SvgStore};
pub use svg::{is_valid_svg, pre_process};

/// Install the default fmt tracing subscriber. Safe to call more than once.
pub fn init_tracing() {
    if tracing_subscriber::fmt().try_init().is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
