//! Folder and svg records.
//!
//! DESIGN
//! ======
//! Records serialize with camelCase keys so the backup document matches the
//! format other installs export. `folderId` is omitted entirely for root svgs
//! rather than written as `null`.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

// =============================================================================
// FOLDER
// =============================================================================

/// A named group of svgs. Mirrors the `folders` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: String,
    pub name: String,
    /// Milliseconds since the Unix epoch.
    #[serde(default, deserialize_with = "lenient_millis")]
    pub created_at: i64,
}

// =============================================================================
// SVG
// =============================================================================

/// A stored piece of svg markup. Mirrors the `svgs` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Svg {
    pub id: String,
    pub code: String,
    /// `None` means the svg lives at the root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_millis")]
    pub created_at: i64,
}

impl Svg {
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.folder_id.is_none()
    }
}

/// Input for [`SvgStore::add_svg`](crate::services::store::SvgStore::add_svg).
#[derive(Debug, Clone, Default)]
pub struct NewSvg {
    pub code: String,
    pub folder_id: Option<String>,
}

impl NewSvg {
    #[must_use]
    pub fn root(code: impl Into<String>) -> Self {
        Self { code: code.into(), folder_id: None }
    }

    #[must_use]
    pub fn in_folder(code: impl Into<String>, folder_id: impl Into<String>) -> Self {
        Self { code: code.into(), folder_id: Some(folder_id.into()) }
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Empty folder ids mean root, same as no folder id.
pub(crate) fn normalize_folder_id(folder_id: Option<&str>) -> Option<&str> {
    folder_id.filter(|fid| !fid.is_empty())
}

/// Read a timestamp from a backup. The import pre-check never looks at
/// `createdAt`, so anything that is not a number (null included) becomes 0
/// instead of failing the whole import. Fractional values are rounded.
fn lenient_millis<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(millis_from_value).unwrap_or(0))
}

#[allow(clippy::cast_possible_truncation)]
fn millis_from_value(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|ms| ms.is_finite()).map(|ms| ms.round() as i64))
}

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub(crate) fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

#[cfg(test)]
#[path = "records_test.rs"]
mod tests;
