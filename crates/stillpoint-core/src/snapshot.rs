//! Snapshot export/import of the full practice state.
//!
//! An export is the persisted blob plus an app tag, a format version, and
//! the export timestamp. Import fails closed: the document must carry the
//! app tag or a numeric total-session count, and any shape mismatch in the
//! remaining fields rejects the whole document. A rejected import leaves
//! existing state untouched; the caller only replaces state on success.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::error::ImportError;
use crate::stats::PracticeData;

pub const APP_TAG: &str = "stillpoint";
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize)]
struct ExportDocument<'a> {
    #[serde(rename = "_app")]
    app: &'a str,
    #[serde(rename = "_version")]
    version: u32,
    #[serde(rename = "_exportedAt")]
    exported_at: DateTime<Utc>,
    #[serde(flatten)]
    data: &'a PracticeData,
}

/// Serialize the full state as a pretty-printed export document.
pub fn export(data: &PracticeData, now: DateTime<Utc>) -> Result<String, serde_json::Error> {
    let doc = ExportDocument {
        app: APP_TAG,
        version: SNAPSHOT_VERSION,
        exported_at: now,
        data,
    };
    serde_json::to_string_pretty(&doc)
}

/// Default file name for an export taken on `today`.
pub fn file_name(today: NaiveDate) -> String {
    format!("{}-{}.json", APP_TAG, today.format("%Y-%m-%d"))
}

/// Parse and validate an import document.
///
/// Missing optional fields backfill with defaults; fields present with the
/// wrong shape reject the document.
pub fn import(json: &str) -> Result<PracticeData, ImportError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let Some(obj) = value.as_object() else {
        return Err(ImportError::NotAnObject);
    };

    let tagged = obj.get("_app").and_then(|v| v.as_str()) == Some(APP_TAG);
    let has_count = obj.get("totalSessions").map(|v| v.is_number()).unwrap_or(false);
    if !tagged && !has_count {
        return Err(ImportError::Unrecognized);
    }

    let mut obj = obj.clone();
    obj.retain(|key, _| !key.starts_with('_'));
    let data: PracticeData = serde_json::from_value(serde_json::Value::Object(obj))?;
    Ok(data)
}
