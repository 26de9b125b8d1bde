//! Minimal quoted-CSV codec for session exchange.
//!
//! Every field is written quoted, with embedded quotes doubled and line breaks
//! collapsed to a single space, so one record always occupies exactly one
//! line. Decoding is a per-line character scanner; it never joins lines.

use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

use crate::session::Session;
use crate::session::format_timestamp;
use crate::session::parse_timestamp;

pub const HEADER: &str = "id,projectName,seconds,startDate,note";

/// Columns a data row must yield before it is accepted.
pub const COLUMN_COUNT: usize = 5;

/// Quote a single field for output.
pub fn escape_field(field: &str) -> String {
    let flattened = field.replace("\r\n", " ").replace(['\n', '\r'], " ");
    format!("\"{}\"", flattened.replace('"', "\"\""))
}

/// Decimal rendering that always keeps a fractional part (`100` -> `100.0`).
pub fn format_seconds(seconds: f64) -> String {
    format!("{seconds:?}")
}

pub fn encode_row(session: &Session) -> String {
    [
        escape_field(&session.id.to_string()),
        escape_field(&session.project_name),
        escape_field(&format_seconds(session.seconds)),
        escape_field(&format_timestamp(&session.start_date)),
        escape_field(&session.note),
    ]
    .join(",")
}

/// Encode the whole collection, header row first.
pub fn encode_sessions(sessions: &[Session]) -> String {
    std::iter::once(HEADER.to_string())
        .chain(sessions.iter().map(encode_row))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split one line into fields, honouring quotes and doubled quotes.
pub fn parse_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    fields.push(current);
    fields
}

/// Build a session from already-split fields. Returns `None` for short rows.
///
/// Unparsable ids are replaced with a fresh one, unparsable durations become
/// zero and unparsable timestamps become the current time.
pub fn session_from_fields(fields: &[String]) -> Option<Session> {
    if fields.len() < COLUMN_COUNT {
        return None;
    }
    let id = Uuid::parse_str(&fields[0]).unwrap_or_else(|_| Uuid::new_v4());
    let seconds = fields[2]
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0);
    let start_date = parse_timestamp(&fields[3]).unwrap_or_else(Utc::now);
    Some(Session {
        id,
        project_name: fields[1].clone(),
        seconds,
        start_date,
        note: fields[4].clone(),
    })
}

/// Decode a CSV document. The first line is treated as a header and skipped;
/// rows with fewer than five fields are dropped.
pub fn decode_sessions(text: &str) -> Vec<Session> {
    let mut sessions = Vec::new();
    for (index, line) in text.lines().enumerate().skip(1) {
        let fields = parse_line(line);
        match session_from_fields(&fields) {
            Some(session) => sessions.push(session),
            None => warn!(
                line = index + 1,
                fields = fields.len(),
                "skipping csv row with too few fields"
            ),
        }
    }
    sessions
}
