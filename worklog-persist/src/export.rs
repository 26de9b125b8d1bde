use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::csv;
use crate::error::Result;
use crate::json;
use crate::session::Session;

/// Supported exchange formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn file_extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    /// Fixed file name each export of this format overwrites.
    pub fn export_file_name(self) -> String {
        format!("worklog-export.{}", self.file_extension())
    }

    /// Infer the format from a file extension, ignoring case.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(ExportFormat::Json),
            "csv" => Some(ExportFormat::Csv),
            _ => None,
        }
    }
}

/// Export sessions to a string in the given format.
pub fn export_sessions(sessions: &[Session], format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => json::encode_pretty(sessions),
        ExportFormat::Csv => {
            for session in sessions {
                session.check_encodable()?;
            }
            Ok(csv::encode_sessions(sessions))
        }
    }
}

/// Import sessions from a string in the given format.
///
/// JSON is all-or-nothing; CSV drops malformed rows and never fails.
pub fn import_sessions(text: &str, format: ExportFormat) -> Result<Vec<Session>> {
    match format {
        ExportFormat::Json => json::decode(text),
        ExportFormat::Csv => Ok(csv::decode_sessions(text)),
    }
}
