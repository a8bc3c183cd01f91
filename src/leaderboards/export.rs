//! Game data export.
//!
//! Provides the JSON export document and the participants CSV.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::stats::ParticipationReport;
use crate::progress::PlayerRecord;

/// Export format version.
pub const EXPORT_VERSION: &str = "1.0";

/// Full dump of every player record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDataExport {
    pub players: Vec<PlayerRecord>,
    pub exported_at: DateTime<Utc>,
    pub version: String,
}

impl GameDataExport {
    /// Build an export of `players` taken at `now`.
    pub fn new(players: Vec<PlayerRecord>, now: DateTime<Utc>) -> Self {
        Self {
            players,
            exported_at: now,
            version: EXPORT_VERSION.to_string(),
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ExportError> {
        serde_json::to_string_pretty(self).map_err(|e| ExportError::SerializationFailed(e.to_string()))
    }

    /// Parse a previously written export.
    pub fn from_json(content: &str) -> Result<Self, ExportError> {
        let export: Self =
            serde_json::from_str(content).map_err(|e| ExportError::ParseError(e.to_string()))?;
        if export.version != EXPORT_VERSION {
            return Err(ExportError::UnsupportedVersion(export.version));
        }
        Ok(export)
    }

    /// Dated download name, e.g. `game_data_2026-10-18.json`.
    pub fn file_name(&self) -> String {
        format!("game_data_{}.json", self.exported_at.format("%Y-%m-%d"))
    }

    /// Write the export into `dir` under its dated name.
    pub fn write_to_dir(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        std::fs::create_dir_all(dir).map_err(|e| ExportError::IoError(e.to_string()))?;
        let path = dir.join(self.file_name());
        std::fs::write(&path, self.to_json()?).map_err(|e| ExportError::IoError(e.to_string()))?;
        tracing::info!(
            "Exported {} players to {}",
            self.players.len(),
            path.display()
        );
        Ok(path)
    }
}

/// Participants table as CSV.
pub fn participants_csv(report: &ParticipationReport) -> String {
    let mut csv = String::new();
    csv.push_str("identity,display_name,contact,registered_at,stages_completed,total_stages,total_score\n");

    for row in &report.participants {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            escape_csv(&row.identity),
            escape_csv(&row.display_name),
            row.contact.as_deref().map_or(String::new(), escape_csv),
            row.registered_at.to_rfc3339(),
            row.stages_completed,
            row.total_stages,
            row.total_score,
        ));
    }

    csv
}

/// Escape a string for CSV.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Export errors.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Unsupported export version: {0}")]
    UnsupportedVersion(String),

    #[error("IO error: {0}")]
    IoError(String),
}
