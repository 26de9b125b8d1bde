use chrono::DateTime;
use chrono::Datelike;
use chrono::SecondsFormat;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::error::PersistError;
use crate::error::Result;

/// One completed interval of tracked work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: Uuid,
    pub project_name: String,
    pub seconds: f64,
    #[serde(with = "timestamp")]
    pub start_date: DateTime<Utc>,
    /// Older stores predate notes, so a missing key decodes as empty.
    #[serde(default)]
    pub note: String,
}

impl Session {
    /// Build a session with a freshly minted id.
    pub fn new(
        project_name: impl Into<String>,
        seconds: f64,
        start_date: DateTime<Utc>,
        note: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_name: project_name.into(),
            seconds,
            start_date,
            note: note.into(),
        }
    }

    /// Overwrite the fields carried by `patch`, leaving the rest untouched.
    pub fn apply(&mut self, patch: SessionPatch) {
        if let Some(project_name) = patch.project_name {
            self.project_name = project_name;
        }
        if let Some(seconds) = patch.seconds {
            self.seconds = seconds;
        }
        if let Some(start_date) = patch.start_date {
            self.start_date = start_date;
        }
        if let Some(note) = patch.note {
            self.note = note;
        }
    }

    /// Fail if the record holds a value the codecs cannot read back: a
    /// non-finite duration or a start date outside years 0000-9999.
    pub fn check_encodable(&self) -> Result<()> {
        if !self.seconds.is_finite() {
            return Err(PersistError::Unencodable {
                id: self.id,
                reason: format!("seconds is not finite: {}", self.seconds),
            });
        }
        if !is_encodable_timestamp(&self.start_date) {
            return Err(PersistError::Unencodable {
                id: self.id,
                reason: format!("startDate out of range: {}", self.start_date),
            });
        }
        Ok(())
    }
}

/// Partial update request. `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionPatch {
    pub project_name: Option<String>,
    pub seconds: Option<f64>,
    pub start_date: Option<DateTime<Utc>>,
    pub note: Option<String>,
}

impl SessionPatch {
    pub fn is_empty(&self) -> bool {
        self.project_name.is_none()
            && self.seconds.is_none()
            && self.start_date.is_none()
            && self.note.is_none()
    }
}

/// Seconds between the Unix epoch and 2001-01-01T00:00:00Z.
const REFERENCE_DATE_OFFSET: i64 = 978_307_200;

/// Whether `value` survives a `format_timestamp` / `parse_timestamp` trip.
pub fn is_encodable_timestamp(value: &DateTime<Utc>) -> bool {
    (0..=9999).contains(&value.year())
}

/// RFC 3339 in UTC with a `Z` suffix; fractional seconds only when non-zero.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
        .filter(is_encodable_timestamp)
}

/// Decode a timestamp stored as seconds since 2001-01-01T00:00:00Z.
pub fn from_reference_seconds(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.floor();
    let nanos = (((seconds - whole) * 1e9).round() as u32).min(999_999_999);
    let unix = REFERENCE_DATE_OFFSET.checked_add(whole as i64)?;
    DateTime::from_timestamp(unix, nanos).filter(is_encodable_timestamp)
}

/// Serde adapter for `startDate`: written as RFC 3339, read from RFC 3339 or
/// from a reference-date number.
pub(crate) mod timestamp {
    use chrono::DateTime;
    use chrono::Utc;
    use serde::Deserialize;
    use serde::Deserializer;
    use serde::Serializer;
    use serde::de::Error as _;

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_timestamp(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawTimestamp {
            Text(String),
            Seconds(f64),
        }

        match RawTimestamp::deserialize(deserializer)? {
            RawTimestamp::Text(raw) => super::parse_timestamp(&raw)
                .ok_or_else(|| D::Error::custom(format!("invalid startDate: {raw}"))),
            RawTimestamp::Seconds(seconds) => super::from_reference_seconds(seconds)
                .ok_or_else(|| D::Error::custom(format!("startDate out of range: {seconds}"))),
        }
    }
}
