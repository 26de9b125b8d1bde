use std::fs;
use std::path::Path;
use std::path::PathBuf;

use chrono::DateTime;
use chrono::Utc;
use tracing::debug;
use tracing::error;
use tracing::info;
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::error::PersistError;
use crate::error::Result;
use crate::export::ExportFormat;
use crate::export::export_sessions;
use crate::export::import_sessions;
use crate::merge::merge_imported;
use crate::session::Session;
use crate::session::SessionPatch;
use crate::store::SessionFile;
use crate::store::write_atomic;

type ChangeListener = Box<dyn Fn(&[Session]) + Send>;

/// Owns the canonical, ordered session collection and its backing file.
///
/// Every mutation rewrites the whole backing file before returning. A failed
/// save is logged and kept in [`SessionRepository::last_persist_error`]; the
/// in-memory change is not rolled back.
pub struct SessionRepository {
    sessions: Vec<Session>,
    file: SessionFile,
    export_dir: PathBuf,
    last_persist_error: Option<PersistError>,
    on_change: Option<ChangeListener>,
}

impl std::fmt::Debug for SessionRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRepository")
            .field("sessions", &self.sessions.len())
            .field("file", &self.file)
            .field("export_dir", &self.export_dir)
            .field("last_persist_error", &self.last_persist_error)
            .finish_non_exhaustive()
    }
}

impl SessionRepository {
    /// Open the repository described by `config`, loading the backing file.
    ///
    /// An unreadable or corrupt backing file does not fail the open: the
    /// repository starts empty and the error is available from
    /// [`last_persist_error`](Self::last_persist_error).
    pub fn open(config: &StoreConfig) -> Result<Self> {
        config.validate()?;
        let file = SessionFile::new(config.store_path());
        let (sessions, last_persist_error) = match file.load() {
            Ok(sessions) => (sessions, None),
            Err(err) => {
                error!(path = %file.path().display(), error = %err, "failed to load sessions");
                (Vec::new(), Some(err))
            }
        };
        Ok(Self {
            sessions,
            file,
            export_dir: config.export_dir.clone(),
            last_persist_error,
            on_change: None,
        })
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn get(&self, id: Uuid) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn store_path(&self) -> &Path {
        self.file.path()
    }

    /// Most recent load/save failure, cleared by the next successful save.
    pub fn last_persist_error(&self) -> Option<&PersistError> {
        self.last_persist_error.as_ref()
    }

    /// Register a hook called with the new collection after each mutation.
    pub fn set_change_listener<F>(&mut self, listener: F)
    where
        F: Fn(&[Session]) + Send + 'static,
    {
        self.on_change = Some(Box::new(listener));
    }

    /// Record a finished session at the front of the collection.
    pub fn create(
        &mut self,
        project_name: &str,
        seconds: f64,
        start_date: DateTime<Utc>,
        note: &str,
    ) -> Session {
        let session = Session::new(project_name, seconds, start_date, note);
        self.sessions.insert(0, session.clone());
        debug!(id = %session.id, project = %session.project_name, "created session");
        self.commit();
        session
    }

    /// Apply `patch` to the session with `id`. Unknown ids are ignored.
    pub fn update(&mut self, id: Uuid, patch: SessionPatch) -> Option<Session> {
        let session = self.sessions.iter_mut().find(|s| s.id == id)?;
        session.apply(patch);
        let updated = session.clone();
        debug!(id = %id, "updated session");
        self.commit();
        Some(updated)
    }

    /// Remove the session with `id` if present, then persist. Returns whether
    /// one was removed.
    pub fn delete(&mut self, id: Uuid) -> bool {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.id != id);
        let removed = self.sessions.len() != before;
        if removed {
            debug!(id = %id, "deleted session");
        }
        self.commit();
        removed
    }

    pub fn clear_all(&mut self) {
        let count = self.sessions.len();
        self.sessions.clear();
        info!(count, "cleared all sessions");
        self.commit();
    }

    /// Write the collection to disk, surfacing any failure to the caller.
    pub fn save(&mut self) -> Result<()> {
        self.file.save(&self.sessions)?;
        self.last_persist_error = None;
        Ok(())
    }

    /// Persist after a mutation; failures are recorded rather than returned.
    fn commit(&mut self) {
        if let Err(err) = self.save() {
            error!(path = %self.file.path().display(), error = %err, "failed to save sessions");
            self.last_persist_error = Some(err);
        }
        if let Some(listener) = &self.on_change {
            listener(&self.sessions);
        }
    }

    pub fn export_json(&self) -> Result<PathBuf> {
        self.export(ExportFormat::Json)
    }

    pub fn export_csv(&self) -> Result<PathBuf> {
        self.export(ExportFormat::Csv)
    }

    /// Write the collection, in its current order, to the fixed export file
    /// for `format` and return that file's location.
    pub fn export(&self, format: ExportFormat) -> Result<PathBuf> {
        let text = export_sessions(&self.sessions, format)?;
        let path = self.export_dir.join(format.export_file_name());
        write_atomic(&path, text.as_bytes())?;
        info!(path = %path.display(), count = self.sessions.len(), ?format, "exported sessions");
        Ok(path)
    }

    pub fn import_json(&mut self, path: &Path) -> Result<usize> {
        self.import_file(path, ExportFormat::Json)
    }

    pub fn import_csv(&mut self, path: &Path) -> Result<usize> {
        self.import_file(path, ExportFormat::Csv)
    }

    /// Read, decode, and merge an exchange file.
    ///
    /// Returns the number of records decoded from the file, which can exceed
    /// the number of new sessions when ids already exist locally. Nothing is
    /// merged if the file cannot be read or decoded.
    pub fn import_file(&mut self, path: &Path, format: ExportFormat) -> Result<usize> {
        let bytes = fs::read(path).map_err(|e| PersistError::io(path, e))?;
        let text = match format {
            ExportFormat::Json => {
                String::from_utf8(bytes).map_err(|e| PersistError::io(path, invalid_utf8(e)))?
            }
            // Bad bytes only spoil the rows they sit in.
            ExportFormat::Csv => String::from_utf8_lossy(&bytes).into_owned(),
        };
        let imported = import_sessions(&text, format)?;
        let count = imported.len();
        self.merge(imported);
        info!(path = %path.display(), count, total = self.sessions.len(), ?format, "imported sessions");
        Ok(count)
    }

    fn merge(&mut self, imported: Vec<Session>) {
        let existing = std::mem::take(&mut self.sessions);
        self.sessions = merge_imported(imported, existing);
        self.commit();
    }
}

fn invalid_utf8(err: std::string::FromUtf8Error) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidData, err)
}
