use std::fs;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::PersistError;
use crate::error::Result;
use crate::json;
use crate::session::Session;

/// Write `contents` to `path` so readers see either the old file or the new
/// one, never a mix: write a sibling temp file, fsync, then rename over.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| PersistError::io(dir, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| PersistError::io(dir, e))?;
    tmp.write_all(contents)
        .map_err(|e| PersistError::io(tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| PersistError::io(tmp.path(), e))?;
    tmp.persist(path)
        .map_err(|e| PersistError::io(path, e.error))?;
    Ok(())
}

/// The single JSON file holding the whole session collection.
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the collection. A missing or blank file is an empty collection.
    pub fn load(&self) -> Result<Vec<Session>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "session file absent, starting empty");
            return Ok(Vec::new());
        }
        let data = fs::read_to_string(&self.path).map_err(|e| PersistError::io(&self.path, e))?;
        if data.trim().is_empty() {
            return Ok(Vec::new());
        }
        let sessions = json::decode(&data)?;
        debug!(path = %self.path.display(), count = sessions.len(), "loaded sessions");
        Ok(sessions)
    }

    /// Replace the file with the given collection.
    pub fn save(&self, sessions: &[Session]) -> Result<()> {
        let json = json::encode_compact(sessions)?;
        write_atomic(&self.path, json.as_bytes())?;
        debug!(path = %self.path.display(), count = sessions.len(), "saved sessions");
        Ok(())
    }
}
