use crate::error::Result;
use crate::session::Session;

/// Pretty-printed array, used for exports.
pub fn encode_pretty(sessions: &[Session]) -> Result<String> {
    check_all(sessions)?;
    Ok(serde_json::to_string_pretty(sessions)?)
}

/// Compact array, used for the backing store.
pub fn encode_compact(sessions: &[Session]) -> Result<String> {
    check_all(sessions)?;
    Ok(serde_json::to_string(sessions)?)
}

/// serde_json writes non-finite floats as `null`, which `decode` rejects.
fn check_all(sessions: &[Session]) -> Result<()> {
    sessions.iter().try_for_each(Session::check_encodable)
}

/// Decode a JSON array of sessions. Any malformed record rejects the document.
pub fn decode(json: &str) -> Result<Vec<Session>> {
    Ok(serde_json::from_str(json)?)
}
