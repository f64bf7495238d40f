//! Session Export
//!
//! Writes session snapshots to disk as one JSON document or as JSON Lines.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use crate::models::SessionSnapshot;
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::ensure_parent;

/// On-disk export format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// The whole snapshot as one pretty-printed document
    #[default]
    Json,
    /// One `SessionRecord` per line, oldest first
    Jsonl,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Jsonl => "jsonl",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "jsonl" | "ndjson" => Ok(ExportFormat::Jsonl),
            other => Err(AppError::validation(format!(
                "unknown export format '{}', expected json or jsonl",
                other
            ))),
        }
    }
}

/// Serialize a snapshot in the given format.
pub fn render_snapshot(snapshot: &SessionSnapshot, format: ExportFormat) -> AppResult<String> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(snapshot)?),
        ExportFormat::Jsonl => {
            let mut output = Vec::new();
            for record in &snapshot.records {
                serde_json::to_writer(&mut output, record)?;
                writeln!(output)?;
            }
            String::from_utf8(output).map_err(|e| AppError::internal(e.to_string()))
        }
    }
}

/// Write a snapshot to `path`, creating parent directories.
///
/// Returns the number of records written.
pub fn write_snapshot(
    path: impl AsRef<Path>,
    snapshot: &SessionSnapshot,
    format: ExportFormat,
) -> AppResult<usize> {
    let path = path.as_ref();
    let data = render_snapshot(snapshot, format)?;
    ensure_parent(path)?;
    fs::write(path, data)?;

    tracing::info!(
        path = %path.display(),
        format = %format,
        records = snapshot.records.len(),
        "exported session snapshot"
    );
    Ok(snapshot.records.len())
}

/// File name such as `session_20250101_103000.jsonl`.
pub fn suggested_filename(snapshot: &SessionSnapshot, format: ExportFormat) -> String {
    format!(
        "session_{}.{}",
        snapshot.exported_at.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}
