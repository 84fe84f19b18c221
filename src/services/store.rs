//! Store service: folder and svg CRUD, cascade delete, bulk export/import.
//!
//! DESIGN
//! ======
//! `SvgStore` is the only reader and writer of the `folders` and `svgs`
//! tables. It is opened explicitly with a `StoreConfig`, cloned into every
//! collaborator that needs it (the pool is shared), and closed explicitly.
//! Callers re-query after each mutation; nothing here caches records.
//!
//! Each operation is its own transaction. Folder delete (with its svg
//! cascade) and import (clear then fill) are single transactions, so they
//! either fully apply or leave the store as it was. Nothing spans two calls:
//! an "add then list" can observe a delete that landed in between.
//!
//! ERROR HANDLING
//! ==============
//! Deletes are idempotent: an unknown id is a no-op, so a collaborator can
//! retry a delete without checking first. Renaming a missing folder is the
//! one missing-target case that returns `NotFound`, because the caller is
//! holding a folder the store no longer has.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::records::{Folder, NewSvg, Svg, new_id, normalize_folder_id, now_ms};
use crate::services::backup::{self, Backup, BackupError};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("folder not found: {0}")]
    NotFound(String),
    #[error("invalid backup: {0}")]
    Format(#[from] BackupError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl crate::error::ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_FOLDER_NOT_FOUND",
            Self::Format(_) => "E_FORMAT",
            Self::Database(_) => "E_DATABASE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Database(sqlx::Error::PoolTimedOut))
    }
}

type SvgRow = (String, String, Option<String>, i64);

fn svg_from_row((id, code, folder_id, created_at): SvgRow) -> Svg {
    Svg { id, code, folder_id, created_at }
}

fn folder_from_row((id, name, created_at): (String, String, i64)) -> Folder {
    Folder { id, name, created_at }
}

/// Handle to the persistent folder/svg collection.
#[derive(Clone, Debug)]
pub struct SvgStore {
    pool: SqlitePool,
}

impl SvgStore {
    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Connect and apply the schema.
    ///
    /// # Errors
    ///
    /// Returns a database error if the connection or migrations fail.
    pub async fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let pool = crate::db::init_pool(config).await?;
        info!(database_url = %config.database_url, "svg store opened");
        Ok(Self { pool })
    }

    /// Close every connection. Later operations fail with a database error.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("svg store closed");
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    // =========================================================================
    // FOLDERS
    // =========================================================================

    /// Create a folder. The name is stored as given, empty included.
    ///
    /// # Errors
    ///
    /// Returns a database error if the insert fails.
    pub async fn add_folder(&self, name: &str) -> Result<Folder, StoreError> {
        let folder = Folder { id: new_id(), name: name.to_string(), created_at: now_ms() };
        sqlx::query("INSERT INTO folders (id, name, created_at) VALUES (?1, ?2, ?3)")
            .bind(&folder.id)
            .bind(&folder.name)
            .bind(folder.created_at)
            .execute(&self.pool)
            .await?;

        info!(folder_id = %folder.id, name = %folder.name, "folder created");
        Ok(folder)
    }

    /// List all folders, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub async fn get_folders(&self) -> Result<Vec<Folder>, StoreError> {
        let rows = sqlx::query_as::<_, (String, String, i64)>(
            "SELECT id, name, created_at FROM folders ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "folders listed");
        Ok(rows.into_iter().map(folder_from_row).collect())
    }

    /// Look up one folder.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub async fn get_folder(&self, id: &str) -> Result<Option<Folder>, StoreError> {
        let row = sqlx::query_as::<_, (String, String, i64)>("SELECT id, name, created_at FROM folders WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(folder_from_row))
    }

    /// Rename a folder, keeping its id and creation time.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no folder has `id`.
    pub async fn update_folder_name(&self, id: &str, new_name: &str) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE folders SET name = ?1 WHERE id = ?2")
            .bind(new_name)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        info!(folder_id = %id, name = %new_name, "folder renamed");
        Ok(())
    }

    /// Delete a folder and every svg filed under it, atomically.
    /// Unknown ids are a no-op.
    ///
    /// # Errors
    ///
    /// Returns a database error if either delete fails; nothing is removed then.
    pub async fn delete_folder(&self, id: &str) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let folders = sqlx::query("DELETE FROM folders WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let svgs = sqlx::query("DELETE FROM svgs WHERE folder_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        if folders == 0 && svgs == 0 {
            debug!(folder_id = %id, "delete of unknown folder ignored");
        } else {
            info!(folder_id = %id, svgs_removed = svgs, "folder deleted");
        }
        Ok(())
    }

    // =========================================================================
    // SVGS
    // =========================================================================

    /// Store new svg markup. An empty folder id is stored as root.
    ///
    /// # Errors
    ///
    /// Returns a database error if the insert fails.
    pub async fn add_svg(&self, new_svg: NewSvg) -> Result<Svg, StoreError> {
        let svg = Svg {
            id: new_id(),
            folder_id: normalize_folder_id(new_svg.folder_id.as_deref()).map(str::to_string),
            code: new_svg.code,
            created_at: now_ms(),
        };
        sqlx::query("INSERT INTO svgs (id, code, folder_id, created_at) VALUES (?1, ?2, ?3, ?4)")
            .bind(&svg.id)
            .bind(&svg.code)
            .bind(&svg.folder_id)
            .bind(svg.created_at)
            .execute(&self.pool)
            .await?;

        info!(svg_id = %svg.id, folder_id = ?svg.folder_id, bytes = svg.code.len(), "svg created");
        Ok(svg)
    }

    /// List svgs in one folder, or at the root.
    ///
    /// `Some(folder_id)` returns exactly that folder's svgs. `None` (or an
    /// empty id) returns only root svgs, never the whole collection.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub async fn get_svgs(&self, folder_id: Option<&str>) -> Result<Vec<Svg>, StoreError> {
        let rows = match normalize_folder_id(folder_id) {
            Some(fid) => {
                sqlx::query_as::<_, SvgRow>(
                    "SELECT id, code, folder_id, created_at FROM svgs
                     WHERE folder_id = ?1
                     ORDER BY created_at ASC, id ASC",
                )
                .bind(fid)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, SvgRow>(
                    "SELECT id, code, folder_id, created_at FROM svgs
                     WHERE folder_id IS NULL
                     ORDER BY created_at ASC, id ASC",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        debug!(folder_id = ?folder_id, count = rows.len(), "svgs listed");
        Ok(rows.into_iter().map(svg_from_row).collect())
    }

    /// Delete one svg. Unknown ids are a no-op.
    ///
    /// # Errors
    ///
    /// Returns a database error if the delete fails.
    pub async fn delete_svg(&self, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM svgs WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            debug!(svg_id = %id, "delete of unknown svg ignored");
        } else {
            info!(svg_id = %id, "svg deleted");
        }
        Ok(())
    }

    // =========================================================================
    // ORPHANS
    // =========================================================================

    /// Svgs whose folder id names a folder that does not exist.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub async fn orphaned_svgs(&self) -> Result<Vec<Svg>, StoreError> {
        let rows = sqlx::query_as::<_, SvgRow>(
            "SELECT id, code, folder_id, created_at FROM svgs
             WHERE folder_id IS NOT NULL
               AND folder_id NOT IN (SELECT id FROM folders)
             ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(svg_from_row).collect())
    }

    /// Delete every orphaned svg. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns a database error if the delete fails.
    pub async fn reconcile_orphans(&self) -> Result<u64, StoreError> {
        let removed = sqlx::query(
            "DELETE FROM svgs
             WHERE folder_id IS NOT NULL
               AND folder_id NOT IN (SELECT id FROM folders)",
        )
        .execute(&self.pool)
        .await?
        .rows_affected();

        if removed > 0 {
            warn!(removed, "orphaned svgs removed");
        }
        Ok(removed)
    }

    // =========================================================================
    // EXPORT / IMPORT
    // =========================================================================

    /// Serialize every folder and svg, unfiltered, with an `exportedAt` stamp.
    ///
    /// # Errors
    ///
    /// Returns a database error if reading fails.
    pub async fn export_data(&self) -> Result<String, StoreError> {
        let mut tx = self.pool.begin().await?;
        let folders = sqlx::query_as::<_, (String, String, i64)>(
            "SELECT id, name, created_at FROM folders ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&mut *tx)
        .await?;
        let svgs = sqlx::query_as::<_, SvgRow>(
            "SELECT id, code, folder_id, created_at FROM svgs ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&mut *tx)
        .await?;
        tx.commit().await?;

        let backup = Backup::new(
            folders.into_iter().map(folder_from_row).collect(),
            svgs.into_iter().map(svg_from_row).collect(),
        );
        let json = backup::encode(&backup)?;

        info!(folders = backup.folders.len(), svgs = backup.svgs.len(), bytes = json.len(), "collection exported");
        Ok(json)
    }

    /// Replace the whole collection with the contents of a backup.
    ///
    /// The backup is parsed and checked before anything is written. The
    /// clear and the refill then run in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `Format` if the JSON is unparseable or `folders`/`svgs` are
    /// not arrays of records, with the store untouched. Returns a database
    /// error if a write fails, with the transaction rolled back.
    pub async fn import_data(&self, json: &str) -> Result<(), StoreError> {
        let backup = match backup::decode(json) {
            Ok(backup) => backup,
            Err(e) => {
                warn!(error = %e, "import rejected");
                return Err(e.into());
            }
        };

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM folders").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM svgs").execute(&mut *tx).await?;
        insert_records(&mut *tx, &backup).await?;
        tx.commit().await?;

        info!(
            folders = backup.folders.len(),
            svgs = backup.svgs.len(),
            exported_at = ?backup.exported_at,
            "collection imported"
        );
        Ok(())
    }
}

/// Insert every backup record. Duplicate ids keep the last record, as a
/// key-value `put` would.
async fn insert_records(conn: &mut SqliteConnection, backup: &Backup) -> Result<(), sqlx::Error> {
    for folder in &backup.folders {
        sqlx::query("INSERT OR REPLACE INTO folders (id, name, created_at) VALUES (?1, ?2, ?3)")
            .bind(&folder.id)
            .bind(&folder.name)
            .bind(folder.created_at)
            .execute(&mut *conn)
            .await?;
    }
    for svg in &backup.svgs {
        sqlx::query("INSERT OR REPLACE INTO svgs (id, code, folder_id, created_at) VALUES (?1, ?2, ?3, ?4)")
            .bind(&svg.id)
            .bind(&svg.code)
            .bind(normalize_folder_id(svg.folder_id.as_deref()))
            .bind(svg.created_at)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
